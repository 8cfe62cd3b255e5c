//! The Kernel: owns the queues, the runtime, every plugin instance, and
//! the config watcher. `start()` builds queues then loads ingestion,
//! execution, and algorithm plugins in that order and spawns the config
//! watcher; `stop()` signals every plugin, joins their threads, and tears
//! the runtime down.

mod exit_code;

pub use exit_code::ExitCode;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{error, info, warn};

use crate::config::{Config, ConfigWatcher};
use crate::errors::NumeriError;
use crate::fault::FaultReporter;
use crate::model::{Fill, Metric, OrderRequest};
use crate::net::{HttpsClient, NullHttpsClient, NullWebSocketClient, WebSocketClient};
use crate::order_tracker::OrderTracker;
use crate::plugin::abi::PluginHandle;
use crate::plugin::loader::{load_plugin, LoadedLibrary};
use crate::plugin::{PluginConfig, Registry, Role};
use crate::queue::BoundedQueue;
use crate::runtime::AsyncRuntime;
use crate::snapshot::BookRegistry;

/// The four bounded queues wired between plugins.
pub struct Queues {
    pub l2: Arc<BoundedQueue<crate::snapshot::Snapshot>>,
    pub metrics: Arc<BoundedQueue<Metric>>,
    pub orders: Arc<BoundedQueue<OrderRequest>>,
    pub fills: Arc<BoundedQueue<Fill>>,
}

impl Queues {
    fn build(config: &Config) -> Self {
        Self {
            l2: Arc::new(BoundedQueue::new(config.metadata.l2_broadcast_buffer)),
            metrics: Arc::new(BoundedQueue::new(config.metadata.metrics_buffer)),
            orders: Arc::new(BoundedQueue::new(config.metadata.order_buffer)),
            fills: Arc::new(BoundedQueue::new(config.metadata.fill_buffer)),
        }
    }
}

/// Spawned plugin worker: the thread running `execute`, plus the handle
/// it runs and the shared object keeping its code mapped in.
struct PluginWorker {
    role: Role,
    handle: Arc<PluginHandle>,
    _library: LoadedLibrary,
    thread: Option<JoinHandle<()>>,
}

pub struct Kernel {
    config_path: PathBuf,
    watcher: Option<ConfigWatcher>,
    watcher_thread: Option<JoinHandle<()>>,
    runtime: Option<AsyncRuntime>,
    queues: Option<Queues>,
    registry: Registry,
    book_registry: Arc<BookRegistry>,
    order_tracker: Arc<OrderTracker>,
    fault: Arc<FaultReporter>,
    workers: Vec<PluginWorker>,
    https: Arc<dyn HttpsClient>,
    websocket: Arc<dyn WebSocketClient>,
    loaded_count: AtomicUsize,
    configured_count: usize,
}

impl Kernel {
    /// Loads the config named by `NUMERI_CONFIG_PATH` (or `config_path`,
    /// if given) but does not start anything yet.
    pub fn load(config_path: impl Into<PathBuf>) -> Result<Self, NumeriError> {
        let config_path = config_path.into();
        let config = Config::load(&config_path)?;

        info!(
            l2_broadcast_buffer = config.metadata.l2_broadcast_buffer,
            metrics_buffer = config.metadata.metrics_buffer,
            order_buffer = config.metadata.order_buffer,
            fill_buffer = config.metadata.fill_buffer,
            data_sources = config.data_sources.len(),
            algorithms = config.algorithms.len(),
            execution_engines = config.execution_engines.len(),
            "loaded configuration"
        );

        let configured_count =
            config.data_sources.len() + config.algorithms.len() + config.execution_engines.len();

        Ok(Self {
            config_path: config_path.clone(),
            watcher: Some(ConfigWatcher::new(config_path, config)),
            watcher_thread: None,
            runtime: None,
            queues: None,
            registry: Registry::new(),
            book_registry: Arc::new(BookRegistry::new()),
            order_tracker: Arc::new(OrderTracker::new()),
            fault: Arc::new(FaultReporter::new()),
            workers: Vec::new(),
            https: Arc::new(NullHttpsClient),
            websocket: Arc::new(NullWebSocketClient),
            loaded_count: AtomicUsize::new(0),
            configured_count,
        })
    }

    pub fn book_registry(&self) -> Arc<BookRegistry> {
        self.book_registry.clone()
    }

    pub fn order_tracker(&self) -> Arc<OrderTracker> {
        self.order_tracker.clone()
    }

    /// The fatal-fault latch every plugin was wired with at `init`.
    pub fn fault_reporter(&self) -> Arc<FaultReporter> {
        self.fault.clone()
    }

    /// Whether any plugin has reported a fatal (invariant-violation) fault.
    /// The binary driving this Kernel should poll this alongside its own
    /// shutdown signal and, if it ever flips, `stop()` and exit with
    /// [`ExitCode::RuntimeCrash`].
    pub fn has_fatal_fault(&self) -> bool {
        self.fault.is_set()
    }

    /// Number of plugin worker threads currently spawned. Zero before
    /// `start()` and after `stop()` has joined them all.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Runs the full start sequence.
    pub fn start(&mut self) -> Result<(), NumeriError> {
        let runtime = AsyncRuntime::start()?;
        let runtime_handle = runtime.handle();
        self.runtime = Some(runtime);

        let config = self
            .watcher
            .as_ref()
            .expect("kernel not loaded")
            .current();

        let queues = Queues::build(&config);

        self.start_ingestion(&config, &queues, &runtime_handle);
        self.start_execution(&config, &queues, &runtime_handle);
        self.start_algorithm(&config, &queues, &runtime_handle);

        self.queues = Some(queues);

        if let Some(watcher) = &self.watcher {
            self.watcher_thread = Some(watcher.spawn());
        }
        info!("started watcher thread");

        let loaded = self.loaded_count.load(Ordering::Acquire);
        if loaded < self.configured_count {
            return Err(NumeriError::PluginLoad {
                name: "*".to_string(),
                file: self.config_path.display().to_string(),
                reason: format!(
                    "{} of {} configured plugins failed to load or initialize",
                    self.configured_count - loaded,
                    self.configured_count
                ),
            });
        }

        Ok(())
    }

    fn start_ingestion(&mut self, config: &Config, queues: &Queues, runtime: &crate::runtime::RuntimeHandle) {
        for entry in &config.data_sources {
            self.load_and_spawn(Role::Ingestor, entry, queues, runtime);
        }
    }

    fn start_algorithm(&mut self, config: &Config, queues: &Queues, runtime: &crate::runtime::RuntimeHandle) {
        for entry in &config.algorithms {
            self.load_and_spawn(Role::Algorithm, entry, queues, runtime);
        }
    }

    fn start_execution(&mut self, config: &Config, queues: &Queues, runtime: &crate::runtime::RuntimeHandle) {
        for entry in &config.execution_engines {
            self.load_and_spawn(Role::ExecutionEngine, entry, queues, runtime);
        }
    }

    fn load_and_spawn(
        &mut self,
        role: Role,
        entry: &crate::config::PluginEntry,
        queues: &Queues,
        runtime: &crate::runtime::RuntimeHandle,
    ) {
        info!(name = %entry.name, role = role.as_str(), "starting plugin");

        let (handle, library) = match load_plugin(&entry.name, &entry.file) {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(name = %entry.name, error = %e, "failed to load plugin");
                return;
            }
        };

        let plugin_config = wire_config(
            role,
            queues,
            runtime,
            self.https.clone(),
            self.websocket.clone(),
            self.book_registry.clone(),
            self.order_tracker.clone(),
            self.fault.clone(),
            entry.params.clone(),
        );

        if let Err(e) = handle.init(plugin_config) {
            error!(name = %entry.name, error = %e, "failed to initialize plugin");
            return;
        }

        let handle = Arc::new(handle);
        self.registry
            .insert(role, entry.name.clone(), handle.clone());
        self.loaded_count.fetch_add(1, Ordering::Release);

        let worker_handle = handle.clone();
        let thread = std::thread::Builder::new()
            .name(format!("numeri-plugin-{}", entry.name))
            .spawn(move || {
                worker_handle.execute();
            })
            .expect("failed to spawn plugin worker thread");

        self.workers.push(PluginWorker {
            role,
            handle,
            _library: library,
            thread: Some(thread),
        });
    }

    /// Runs the stop sequence: ingestors first, then algorithms, then
    /// execution engines, so producers stop before their consumers finish
    /// draining; joins every worker thread; tears the runtime down.
    pub fn stop(&mut self) {
        if let Some(watcher) = &self.watcher {
            watcher.stop();
        }

        for role in [Role::Ingestor, Role::Algorithm, Role::ExecutionEngine] {
            for worker in self.workers.iter().filter(|w| w.role == role) {
                worker.handle.stop();
            }
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                let _ = thread.join();
            }
        }

        if let Some(thread) = self.watcher_thread.take() {
            let _ = thread.join();
        }

        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown(std::time::Duration::from_secs(30));
        }

        self.queues = None;
        self.book_registry.clear();
        warn!("kernel stopped");
    }
}

#[allow(clippy::too_many_arguments)]
fn wire_config(
    role: Role,
    queues: &Queues,
    runtime: &crate::runtime::RuntimeHandle,
    https: Arc<dyn HttpsClient>,
    websocket: Arc<dyn WebSocketClient>,
    book_registry: Arc<crate::snapshot::BookRegistry>,
    order_tracker: Arc<OrderTracker>,
    fault: Arc<FaultReporter>,
    params: serde_json::Value,
) -> PluginConfig {
    match role {
        Role::Ingestor => PluginConfig {
            l2_out: Some(queues.l2.clone()),
            metrics_out: Some(queues.metrics.clone()),
            order_out: None,
            fill_in: None,
            runtime: runtime.clone(),
            https,
            websocket,
            book_registry,
            order_tracker,
            fault,
            params,
        },
        Role::Algorithm => PluginConfig {
            l2_out: Some(queues.l2.clone()),
            metrics_out: Some(queues.metrics.clone()),
            order_out: Some(queues.orders.clone()),
            fill_in: Some(queues.fills.clone()),
            runtime: runtime.clone(),
            https,
            websocket,
            book_registry,
            order_tracker,
            fault,
            params,
        },
        Role::ExecutionEngine => PluginConfig {
            l2_out: None,
            metrics_out: None,
            order_out: Some(queues.orders.clone()),
            fill_in: Some(queues.fills.clone()),
            runtime: runtime.clone(),
            https,
            websocket,
            book_registry,
            order_tracker,
            fault,
            params,
        },
    }
}
