//! Example Algorithm plugin.
//!
//! Pops from the L2 queue in a loop guarded by an atomic running flag;
//! `stop()` clears the flag under release ordering. This Algorithm derives
//! a `MidPrice` metric from every valid snapshot read, crosses the spread
//! with a one-lot order on every fresh snapshot so the order/fill loop
//! actually runs end to end, and drains the fill queue into
//! [`numeri_core::order_tracker::OrderTracker`] so a downstream consumer
//! can ask "what happened to the order I placed".

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::info;

use numeri_core::errors::NumeriError;
use numeri_core::export_plugin;
use numeri_core::model::{Metric, MetricKind, OrderRequest, Side};
use numeri_core::order_tracker::OrderTracker;
use numeri_core::plugin::{Plugin, PluginConfig};
use numeri_core::queue::{BoundedQueue, PopOutcome};
use numeri_core::snapshot::Snapshot;

pub struct Algorithm1 {
    running: Arc<AtomicBool>,
    l2_out: Option<Arc<BoundedQueue<Snapshot>>>,
    metrics_out: Option<Arc<BoundedQueue<Metric>>>,
    order_out: Option<Arc<BoundedQueue<OrderRequest>>>,
    fill_in: Option<Arc<BoundedQueue<numeri_core::model::Fill>>>,
    order_tracker: Option<Arc<OrderTracker>>,
    next_order_id: AtomicU64,
}

impl Default for Algorithm1 {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            l2_out: None,
            metrics_out: None,
            order_out: None,
            fill_in: None,
            order_tracker: None,
            next_order_id: AtomicU64::new(1),
        }
    }
}

impl Plugin for Algorithm1 {
    fn name(&self) -> &str {
        "Algorithm1"
    }

    fn init(&mut self, config: PluginConfig) -> Result<(), NumeriError> {
        self.l2_out = config.l2_out;
        self.metrics_out = config.metrics_out;
        self.order_out = config.order_out;
        self.fill_in = config.fill_in;
        self.order_tracker = Some(config.order_tracker);
        Ok(())
    }

    fn execute(&mut self) {
        let l2_out = self.l2_out.clone().expect("init must run before execute");
        let metrics_out = self
            .metrics_out
            .clone()
            .expect("init must run before execute");
        let fill_in = self.fill_in.clone();
        let order_tracker = self.order_tracker.clone();

        while self.running.load(Ordering::Acquire) {
            if let PopOutcome::Some(snapshot) = l2_out.pop() {
                let book = snapshot.read();
                let bid = book.best_bid();
                let ask = book.best_ask();
                if bid > 0.0 && ask > 0.0 {
                    info!(symbol = book.symbol(), bid, ask, "received snapshot");
                    let metric = Metric {
                        symbol: book.symbol().to_string(),
                        kind: MetricKind::MidPrice,
                        value: (bid + ask) / 2.0,
                        timestamp_ns: book.last_update_ns(),
                    };
                    // Metrics use drop-newest on a full queue.
                    metrics_out.push_drop_newest(metric);

                    // Simple spread-cross signal: buy one lot at the ask on
                    // every fresh snapshot, so the order queue actually
                    // carries a request for an Execution Engine to fill.
                    self.emit_order(book.symbol(), Side::Buy, ask, 1.0);
                }
            }

            if let (Some(fill_in), Some(tracker)) = (&fill_in, &order_tracker) {
                while let PopOutcome::Some(fill) = fill_in.pop() {
                    tracker.record(&fill);
                }
            }

            std::thread::sleep(Duration::from_secs(1));
        }
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Algorithm1 {
    /// Emits a limit order at `price`, crossing the spread against the far
    /// touch so a waiting Execution Engine fills it immediately. Called
    /// from `execute` on every fresh snapshot.
    pub fn emit_order(&self, symbol: &str, side: Side, price: f64, quantity: f64) {
        let Some(order_out) = &self.order_out else {
            return;
        };
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        let request = OrderRequest {
            symbol: symbol.to_string(),
            side,
            price,
            quantity,
            client_order_id: format!("algo1-{id}"),
            timestamp_ns: now_ns(),
        };
        // Orders use drop-newest on a full queue.
        order_out.push_drop_newest(request);
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

export_plugin!(Algorithm1);
