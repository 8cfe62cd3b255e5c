//! Shared asynchronous I/O runtime.
//!
//! One `tokio` multi-thread runtime is built by the Kernel at start and
//! handed to every ingestor/execution-engine plugin that needs to post
//! network work. Holding the runtime (and a cloned [`tokio::runtime::Handle`])
//! alive for the Kernel's lifetime is the work-guard: dropping the runtime
//! releases it, stops the executor, and joins its worker threads.

use std::sync::Arc;

use tokio::runtime::{Handle, Runtime};

use crate::errors::NumeriError;

/// Owns the tokio runtime. Kernel-only; plugins receive a [`RuntimeHandle`].
pub struct AsyncRuntime {
    runtime: Runtime,
}

impl AsyncRuntime {
    /// Builds a multi-thread runtime with `max(1, hardware_concurrency)`
    /// worker threads.
    pub fn start() -> Result<Self, NumeriError> {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .max(1);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_all()
            .thread_name("numeri-io")
            .build()
            .map_err(|e| NumeriError::Configuration(format!("failed to start runtime: {e}")))?;

        Ok(Self { runtime })
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: self.runtime.handle().clone(),
        }
    }

    /// Releases the work-guard and joins the executor's worker threads.
    /// Blocks until every spawned task has either completed or the
    /// shutdown timeout elapses.
    pub fn shutdown(self, timeout: std::time::Duration) {
        self.runtime.shutdown_timeout(timeout);
    }
}

/// A cheaply-cloneable handle plugins use to spawn work onto the shared
/// runtime, without owning (or being able to shut down) the runtime itself.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Handle,
}

impl RuntimeHandle {
    pub fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.inner.spawn(future)
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.inner.block_on(future)
    }
}

/// Test-only handle backed by a freshly built current-thread runtime,
/// for unit tests that need a [`RuntimeHandle`] without the Kernel.
#[cfg(test)]
pub fn test_handle() -> (Arc<Runtime>, RuntimeHandle) {
    let rt = Arc::new(
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap(),
    );
    let handle = RuntimeHandle {
        inner: rt.handle().clone(),
    };
    (rt, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn async_runtime_starts_and_shuts_down() {
        let runtime = AsyncRuntime::start().unwrap();
        let handle = runtime.handle();
        let result = handle.block_on(async { 1 + 1 });
        assert_eq!(result, 2);
        runtime.shutdown(std::time::Duration::from_secs(1));
    }
}
