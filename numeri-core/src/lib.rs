//! numeri-core: the Kernel, plugin ABI, and lock-free data plane for a
//! plugin-based market-data and trading pipeline.
//!
//! ## Core modules
//! - [`queue`]: bounded MPMC queue, the transport for every cross-plugin handle.
//! - [`orderbook`]: the versioned, double-buffered level-2 book.
//! - [`snapshot`]: the lock-free publication protocol over a book registry.
//! - [`plugin`]: the stable C ABI and the safe `Plugin` trait on top of it.
//! - [`kernel`]: boots queues, loads plugins, owns the lifecycle.
//! - [`config`]: the JSON config document and its hot-reload watcher.
//!
//! ## Supporting modules
//! - [`model`]: the wire-level value types (`OrderRequest`, `Fill`, `Metric`, ...).
//! - [`errors`]: the typed error taxonomy.
//! - [`fault`]: the plugin-to-Kernel fatal-fault latch.
//! - [`net`]: the out-of-scope HTTPS/WebSocket client contracts plus null impls.
//! - [`runtime`]: the shared tokio I/O executor.
//! - [`order_tracker`]: client-order-state lookup on top of the fill queue.

pub mod config;
pub mod errors;
pub mod fault;
pub mod kernel;
pub mod model;
pub mod net;
pub mod order_tracker;
pub mod orderbook;
pub mod plugin;
pub mod queue;
pub mod runtime;
pub mod snapshot;
pub mod utils;

pub use errors::{NumeriError, Result};

/// Convenience re-exports for plugin and kernel authors.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::errors::{NumeriError, Result};
    pub use crate::model::{Fill, Metric, MetricKind, OrderRequest, PriceLevel, Side, Status};
    pub use crate::orderbook::{BookUpdate, OrderBook};
    pub use crate::plugin::{Plugin, PluginConfig, Role};
    pub use crate::queue::{BoundedQueue, PopOutcome, PushOutcome};
    pub use crate::snapshot::{BookRegistry, Snapshot};
}
