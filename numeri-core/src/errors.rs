//! Error taxonomy for the kernel and plugin runtime.
//!
//! One variant per row of the error-handling table: configuration, plugin
//! load, plugin init, queue-full, transient I/O, protocol, and invariant
//! violation. [`NumeriError::InvariantViolation`] is the only variant the
//! kernel treats as fatal; everything else is logged and the offending
//! component is skipped or retried by its caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NumeriError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to load plugin '{name}' from {file}: {reason}")]
    PluginLoad {
        name: String,
        file: String,
        reason: String,
    },

    #[error("plugin '{name}' failed to initialize: {reason}")]
    PluginInit { name: String, reason: String },

    #[error("queue '{queue}' is full")]
    QueueFull { queue: String },

    #[error("transient I/O error in '{component}': {reason}")]
    TransientIo { component: String, reason: String },

    #[error("protocol error from '{component}': {reason}")]
    Protocol { component: String, reason: String },

    #[error("invariant violation in '{component}': {reason}")]
    InvariantViolation { component: String, reason: String },
}

impl NumeriError {
    /// Whether this error is fatal and should bring the process down.
    ///
    /// Only an invariant violation is fatal: the process exits.
    /// Every other kind is either skipped, logged, or retried by its caller.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NumeriError::InvariantViolation { .. })
    }
}

pub type Result<T> = std::result::Result<T, NumeriError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invariant_violation_is_fatal() {
        assert!(NumeriError::InvariantViolation {
            component: "orderbook".into(),
            reason: "sequence went backwards".into()
        }
        .is_fatal());

        assert!(!NumeriError::QueueFull {
            queue: "order".into()
        }
        .is_fatal());
        assert!(!NumeriError::Configuration("missing env var".into()).is_fatal());
    }
}
