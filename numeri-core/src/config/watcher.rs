//! Config hot-reload.
//!
//! A dedicated thread polls the config file's mtime on an interval. On a
//! newer mtime the file is reparsed and, if valid, swapped in atomically;
//! a parse failure is logged and the previous config is retained.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use arc_swap::ArcSwap;

use super::Config;

/// How often the watcher checks the file's mtime.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Holds the live config behind an atomic pointer so readers never block
/// the watcher thread and the watcher never blocks a reader.
pub struct ConfigWatcher {
    path: PathBuf,
    current: Arc<ArcSwap<Config>>,
    running: Arc<AtomicBool>,
    last_modified: std::sync::Mutex<Option<SystemTime>>,
}

impl ConfigWatcher {
    /// Wraps an already-loaded config and remembers the file's current
    /// mtime so the first poll doesn't immediately "discover" a change.
    pub fn new(path: impl Into<PathBuf>, initial: Config) -> Self {
        let path = path.into();
        let last_modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        Self {
            path,
            current: Arc::new(ArcSwap::from_pointee(initial)),
            running: Arc::new(AtomicBool::new(true)),
            last_modified: std::sync::Mutex::new(last_modified),
        }
    }

    /// The current, possibly-reloaded, config. Cheap: one atomic load.
    pub fn current(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// Spawns the polling thread. Returns the join handle; the Kernel
    /// joins it during `stop()` after setting `running` to `false`.
    pub fn spawn(&self) -> std::thread::JoinHandle<()> {
        let path = self.path.clone();
        let current = self.current.clone();
        let running = self.running.clone();
        let last_modified = self.last_modified.lock().unwrap().clone();

        std::thread::Builder::new()
            .name("numeri-config-watcher".to_string())
            .spawn(move || {
                let mut last_modified = last_modified;
                while running.load(Ordering::Acquire) {
                    std::thread::sleep(POLL_INTERVAL);
                    check_for_update(&path, &current, &mut last_modified);
                }
            })
            .expect("failed to spawn config watcher thread")
    }

    /// Signals the watcher thread to exit after its next sleep.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

fn check_for_update(
    path: &PathBuf,
    current: &Arc<ArcSwap<Config>>,
    last_modified: &mut Option<SystemTime>,
) {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to stat config file");
            return;
        }
    };

    let is_newer = match last_modified {
        Some(prev) => modified > *prev,
        None => true,
    };
    if !is_newer {
        return;
    }

    match Config::load(path) {
        Ok(new_config) => {
            current.store(Arc::new(new_config));
            *last_modified = Some(modified);
            tracing::info!(path = %path.display(), "config was updated");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "error updating config, retaining previous");
        }
    }
}
