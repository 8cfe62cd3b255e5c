//! Configuration loading and hot-reload.
//!
//! The document is a plain JSON tree loaded via `serde_json`: queue
//! capacities and the three plugin-entry lists the Kernel loads from at
//! start. Loading is fully wired here rather than stubbed, since resolving
//! this document is on the critical path of every Kernel start.

pub mod types;
mod watcher;

pub use types::{Config, Metadata, PluginEntry};
pub use watcher::{ConfigWatcher, POLL_INTERVAL};

use std::collections::HashSet;
use std::path::Path;

use crate::errors::NumeriError;

/// Environment variable naming the config file's path.
pub const CONFIG_PATH_ENV: &str = "NUMERI_CONFIG_PATH";

impl Config {
    /// Reads and parses the JSON document at `path`, then validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NumeriError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            NumeriError::Configuration(format!("config file not found: {}: {e}", path.display()))
        })?;

        let config: Config = serde_json::from_str(&text).map_err(|e| {
            NumeriError::Configuration(format!("malformed config JSON: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reads [`CONFIG_PATH_ENV`] and loads the file it names.
    pub fn load_default() -> Result<Self, NumeriError> {
        let path = std::env::var(CONFIG_PATH_ENV).map_err(|_| {
            NumeriError::Configuration(format!("{CONFIG_PATH_ENV} is not set"))
        })?;
        Self::load(path)
    }

    /// Validates queue capacities and plugin entries.
    ///
    /// At most one ingestor may be declared per symbol.
    pub fn validate(&self) -> Result<(), NumeriError> {
        if self.metadata.l2_broadcast_buffer == 0 {
            return Err(NumeriError::Configuration(
                "metadata.l2_broadcast_buffer must be positive".to_string(),
            ));
        }
        if self.metadata.metrics_buffer == 0 {
            return Err(NumeriError::Configuration(
                "metadata.metrics_buffer must be positive".to_string(),
            ));
        }
        if self.metadata.order_buffer == 0 {
            return Err(NumeriError::Configuration(
                "metadata.order_buffer must be positive".to_string(),
            ));
        }
        if self.metadata.fill_buffer == 0 {
            return Err(NumeriError::Configuration(
                "metadata.fill_buffer must be positive".to_string(),
            ));
        }

        let mut seen_symbols = HashSet::new();
        for entry in &self.data_sources {
            if let Some(symbol) = entry.symbol() {
                if !seen_symbols.insert(symbol.to_string()) {
                    return Err(NumeriError::Configuration(format!(
                        "multiple ingestors declared for symbol '{symbol}'"
                    )));
                }
            }
        }

        for (label, entries) in [
            ("data_sources", &self.data_sources),
            ("algorithms", &self.algorithms),
            ("execution_engines", &self.execution_engines),
        ] {
            let mut names = HashSet::new();
            for entry in entries {
                if entry.name.is_empty() {
                    return Err(NumeriError::Configuration(format!(
                        "{label} entry has an empty name"
                    )));
                }
                if !names.insert(entry.name.clone()) {
                    return Err(NumeriError::Configuration(format!(
                        "duplicate {label} entry named '{}'",
                        entry.name
                    )));
                }
            }
        }

        Ok(())
    }
}
