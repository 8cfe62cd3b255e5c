use serde::{Deserialize, Serialize};

/// Capacities for the four bounded queues, read at Kernel start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub l2_broadcast_buffer: usize,
    pub metrics_buffer: usize,
    pub order_buffer: usize,
    pub fill_buffer: usize,
}

/// One entry in `data_sources[]`, `algorithms[]`, or `execution_engines[]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    pub file: String,
    #[serde(default = "default_params")]
    pub params: serde_json::Value,
}

fn default_params() -> serde_json::Value {
    serde_json::json!({})
}

impl PluginEntry {
    /// The symbol this entry trades, if its params declare one. Used to
    /// enforce "one ingestor per symbol" during config validation.
    pub fn symbol(&self) -> Option<&str> {
        self.params.get("symbol").and_then(|v| v.as_str())
    }
}

/// The JSON configuration document. Unknown top-level keys are ignored by
/// `serde`'s default behavior (no `deny_unknown_fields`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub metadata: Metadata,
    #[serde(default)]
    pub data_sources: Vec<PluginEntry>,
    #[serde(default)]
    pub algorithms: Vec<PluginEntry>,
    #[serde(default)]
    pub execution_engines: Vec<PluginEntry>,
}
