//! Plugin runtime contract and ABI boundary
//!
//! A plugin is a `cdylib` exposing exactly two `extern "C"` symbols —
//! `create_plugin`/`destroy_plugin` — behind which sits a `#[repr(C)]`
//! vtable of raw function pointers plus an opaque state pointer (see
//! [`abi`]). Plugin authors never touch that vtable directly: they
//! implement the safe [`Plugin`] trait and call [`crate::export_plugin!`],
//! which generates the `extern "C"` shims and the vtable glue.
//!
//! The host side only ever calls back through the vtable, so a panic
//! inside a plugin's Rust code is caught at the shim and turned into a
//! logged error rather than unwinding across the ABI.

pub mod abi;
pub mod loader;

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::NumeriError;
use crate::model::{Fill, Metric, OrderRequest};
use crate::net::{HttpsClient, WebSocketClient};
use crate::queue::BoundedQueue;
use crate::snapshot::Snapshot;

/// Which of the three roles a loaded plugin was configured under. Which
/// queue endpoints it receives is a policy of the role, not of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Ingestor,
    Algorithm,
    ExecutionEngine,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ingestor => "ingestor",
            Role::Algorithm => "algorithm",
            Role::ExecutionEngine => "execution_engine",
        }
    }
}

/// Free-form parameters passed to a plugin's `init`, taken verbatim from
/// the `params` object of its config entry.
pub type PluginParams = serde_json::Value;

/// The queue endpoints and shared handles a plugin receives at `init`.
/// Every field is an `Option` because a given role only uses a subset;
/// the loader populates the subset appropriate to the plugin's [`Role`]
/// and leaves the rest `None`.
#[derive(Clone)]
pub struct PluginConfig {
    pub l2_out: Option<Arc<BoundedQueue<Snapshot>>>,
    pub metrics_out: Option<Arc<BoundedQueue<Metric>>>,
    pub order_out: Option<Arc<BoundedQueue<OrderRequest>>>,
    pub fill_in: Option<Arc<BoundedQueue<Fill>>>,
    pub runtime: crate::runtime::RuntimeHandle,
    pub https: Arc<dyn HttpsClient>,
    pub websocket: Arc<dyn WebSocketClient>,
    /// The Kernel-owned published-book registry, initialised during
    /// `start_ingestion`. Ingestors use this to obtain their symbol's cell
    /// via [`crate::snapshot::BookRegistry::cell_for`].
    pub book_registry: Arc<crate::snapshot::BookRegistry>,
    /// The client-order-state table. Algorithms consult it; execution-facing
    /// code updates it as fills are observed.
    pub order_tracker: Arc<crate::order_tracker::OrderTracker>,
    /// The Kernel-owned fatal-fault latch. A plugin that hits an
    /// unrecoverable condition (e.g. an order-book invariant violation)
    /// reports it here instead of unwinding or silently continuing; the
    /// Kernel polls this to decide whether to shut the whole process down.
    pub fault: Arc<crate::fault::FaultReporter>,
    pub params: PluginParams,
}

/// The safe, object-safe trait a plugin author implements. The host never
/// calls these methods directly — `export_plugin!` wraps a `Box<dyn
/// Plugin>` behind the `extern "C"` vtable in [`abi`].
pub trait Plugin: Send {
    /// Stable identifier, used in logs and the role registries.
    fn name(&self) -> &str;

    /// Called exactly once, before `execute`. Must be idempotent: a second
    /// call (which should never happen under the current contract, but a
    /// defensive plugin may still guard against it) must not double-init.
    fn init(&mut self, config: PluginConfig) -> Result<(), NumeriError>;

    /// The plugin's run loop. Returns only after `stop()` has been
    /// observed. Runs on a dedicated OS thread owned by the Kernel.
    fn execute(&mut self);

    /// Asynchronous request to wind down. Safe to call from a thread other
    /// than the one running `execute`. Must be idempotent.
    fn stop(&self);
}

/// Role-typed registry of loaded plugin instances, owned by the Kernel.
#[derive(Default)]
pub struct Registry {
    instances: HashMap<Role, HashMap<String, Arc<abi::PluginHandle>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
        }
    }

    pub fn insert(&mut self, role: Role, name: String, handle: Arc<abi::PluginHandle>) {
        self.instances.entry(role).or_default().insert(name, handle);
    }

    pub fn role(&self, role: Role) -> impl Iterator<Item = (&String, &Arc<abi::PluginHandle>)> {
        self.instances.get(&role).into_iter().flat_map(|m| m.iter())
    }

    pub fn all(&self) -> impl Iterator<Item = (&Role, &String, &Arc<abi::PluginHandle>)> {
        self.instances
            .iter()
            .flat_map(|(role, m)| m.iter().map(move |(name, h)| (role, name, h)))
    }

    pub fn len(&self) -> usize {
        self.instances.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
