//! Example Execution Engine plugin: an instant-fill paper-trading backend.
//!
//! Pops an order off the order queue and immediately fills it at the
//! requested price and quantity, so the order/fill loop is exercised
//! end to end without a real exchange connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::info;

use numeri_core::errors::NumeriError;
use numeri_core::export_plugin;
use numeri_core::model::{Fill, OrderRequest, Status};
use numeri_core::plugin::{Plugin, PluginConfig};
use numeri_core::queue::{BoundedQueue, PopOutcome};

pub struct SimulatedExecutionEngine {
    running: Arc<AtomicBool>,
    order_out: Option<Arc<BoundedQueue<OrderRequest>>>,
    fill_in: Option<Arc<BoundedQueue<Fill>>>,
}

impl Default for SimulatedExecutionEngine {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            order_out: None,
            fill_in: None,
        }
    }
}

impl Plugin for SimulatedExecutionEngine {
    fn name(&self) -> &str {
        "SimulatedExecutionEngine"
    }

    fn init(&mut self, config: PluginConfig) -> Result<(), NumeriError> {
        self.order_out = config.order_out;
        self.fill_in = config.fill_in;
        Ok(())
    }

    fn execute(&mut self) {
        let order_out = self
            .order_out
            .clone()
            .expect("init must run before execute");
        let fill_in = self.fill_in.clone().expect("init must run before execute");

        while self.running.load(Ordering::Acquire) {
            if let PopOutcome::Some(order) = order_out.pop() {
                info!(
                    client_order_id = %order.client_order_id,
                    symbol = %order.symbol,
                    "filling order"
                );
                let fill = Fill {
                    client_order_id: order.client_order_id,
                    exchange_order_id: format!("sim-{}", now_ns()),
                    status: Status::Fill,
                    filled_quantity: order.quantity,
                    filled_price: order.price,
                    timestamp_ns: now_ns(),
                };
                // Fills use drop-newest on a full queue.
                fill_in.push_drop_newest(fill);
            }

            std::thread::sleep(Duration::from_millis(50));
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

export_plugin!(SimulatedExecutionEngine);
