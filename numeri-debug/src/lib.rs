//! Shared helpers for the `numeri-debug` binaries.
//!
//! Neither bin attaches to a running Kernel process: this is a single-host,
//! single-process system with no inter-process messaging, so a standalone
//! debug tool has no IPC channel to a live Kernel's queues or book
//! registry. Both bins instead drive a local
//! [`numeri_core::snapshot::BookPublisher`] with a simulated random-walk
//! feed.

use std::sync::Arc;

use numeri_core::model::Side;
use numeri_core::orderbook::{BookUpdate, OrderBook};
use numeri_core::snapshot::{BookPublisher, BookRegistry};
use rand::Rng;

/// Drives one [`BookPublisher`] with a simulated random-walk tick, mutating
/// both sides of the inactive buffer and publishing.
pub struct SimulatedFeed {
    publisher: BookPublisher,
    registry: BookRegistry,
    mid: f64,
    tick: u64,
}

impl SimulatedFeed {
    pub fn new(symbol: impl Into<String>, registry: BookRegistry, start_mid: f64) -> Self {
        Self {
            publisher: BookPublisher::new(symbol, &registry),
            registry,
            mid: start_mid,
            tick: 0,
        }
    }

    /// The most recently published book for this feed's symbol.
    pub fn current(&self) -> Arc<OrderBook> {
        self.registry
            .current(self.publisher.symbol())
            .expect("registry cell is created in SimulatedFeed::new")
    }

    pub fn symbol(&self) -> &str {
        self.publisher.symbol()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Applies one simulated tick and publishes, returning the resulting
    /// snapshot's version.
    pub fn tick(&mut self) -> u64 {
        let mut rng = rand::thread_rng();
        let drift: f64 = rng.gen_range(-0.05..0.05);
        self.mid = (self.mid + drift).max(1.0);

        for depth in 0..5u32 {
            let offset = 0.5 + depth as f64;
            let qty = 1.0 + depth as f64 * 0.25;
            if let Err(e) = self
                .publisher
                .apply(BookUpdate::new(Side::Buy, self.mid - offset, qty))
            {
                tracing::error!(symbol = self.publisher.symbol(), error = %e, "fatal error applying simulated bid update");
            }
            if let Err(e) = self
                .publisher
                .apply(BookUpdate::new(Side::Sell, self.mid + offset, qty))
            {
                tracing::error!(symbol = self.publisher.symbol(), error = %e, "fatal error applying simulated ask update");
            }
        }

        self.tick += 1;
        let snapshot = self.publisher.publish(now_ns());
        snapshot.version
    }
}

fn now_ns() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
