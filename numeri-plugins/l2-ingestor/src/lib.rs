//! Example Ingestor plugin: a simulated L2 feed.
//!
//! Owns a book-pair via [`numeri_core::snapshot::BookPublisher`], and on
//! every iteration mutates the inactive buffer with a small simulated
//! price move, then publishes, pushing the resulting [`Snapshot`] onto
//! the L2 queue with the drop-oldest policy — the one queue in the system
//! that uses it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::{error, info};

use numeri_core::errors::NumeriError;
use numeri_core::export_plugin;
use numeri_core::fault::FaultReporter;
use numeri_core::orderbook::BookUpdate;
use numeri_core::model::Side;
use numeri_core::plugin::{Plugin, PluginConfig};
use numeri_core::queue::BoundedQueue;
use numeri_core::snapshot::{BookPublisher, Snapshot};

pub struct L2Ingestor {
    running: Arc<AtomicBool>,
    l2_out: Option<Arc<BoundedQueue<Snapshot>>>,
    publisher: Option<BookPublisher>,
    fault: Option<Arc<FaultReporter>>,
    symbol: String,
    mid: f64,
}

impl Default for L2Ingestor {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            l2_out: None,
            publisher: None,
            fault: None,
            symbol: String::new(),
            mid: 100.0,
        }
    }
}

impl Plugin for L2Ingestor {
    fn name(&self) -> &str {
        "L2 ingestor"
    }

    fn init(&mut self, config: PluginConfig) -> Result<(), NumeriError> {
        self.symbol = config
            .params
            .get("symbol")
            .and_then(|v| v.as_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        info!(symbol = %self.symbol, params = %config.params, "initialized l2 ingestor");

        if config.l2_out.is_none() {
            return Err(NumeriError::PluginInit {
                name: self.name().to_string(),
                reason: "no L2 queue wired".to_string(),
            });
        }
        self.l2_out = config.l2_out;
        self.publisher = Some(BookPublisher::new(self.symbol.clone(), &config.book_registry));
        self.fault = Some(config.fault);
        Ok(())
    }

    fn execute(&mut self) {
        info!("Hello from L2 ingestor!");
        let l2_out = self.l2_out.clone().expect("init must run before execute");
        let publisher = self.publisher.as_mut().expect("init must run before execute");
        let fault = self.fault.clone().expect("init must run before execute");

        let mut rng = rand::thread_rng();
        while self.running.load(Ordering::Acquire) {
            // Simulate a small random-walk tick on both sides of the book.
            let drift: f64 = rng.gen_range(-0.05..0.05);
            self.mid = (self.mid + drift).max(1.0);
            let applied = publisher
                .apply(BookUpdate::new(Side::Buy, self.mid - 0.5, 1.0))
                .and_then(|()| publisher.apply(BookUpdate::new(Side::Sell, self.mid + 0.5, 1.0)));

            // An invariant violation (e.g. a crossed book) is fatal: report
            // it to the Kernel and stop ingesting rather than keep
            // publishing a book known to be inconsistent.
            if let Err(err) = applied {
                error!(symbol = %self.symbol, error = %err, "fatal error applying book update");
                fault.report("l2-ingestor", err);
                self.running.store(false, Ordering::Release);
                break;
            }

            let snapshot = publisher.publish(now_ns());
            // The one queue in the system that drops the oldest entry
            // rather than the newest on overflow.
            l2_out.push_drop_oldest(snapshot);

            std::thread::sleep(Duration::from_secs(1));
        }
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

export_plugin!(L2Ingestor);
