//! Fatal-fault reporting from plugins back to the Kernel.
//!
//! An [`NumeriError::InvariantViolation`] is the
//! one error kind the Kernel never swallows: it is fatal and the process
//! exits. Plugins run `execute` on their own thread and never unwind
//! across the ABI (see [`crate::plugin::abi`]), so there is no call stack
//! connecting a fatal error inside a plugin back to the Kernel's own
//! thread. [`FaultReporter`] is the shared, Kernel-owned handle every
//! plugin receives through [`crate::plugin::PluginConfig`] to close that
//! gap: a plugin calls [`FaultReporter::report`] with the error it hit,
//! and the Kernel (or the binary driving it) polls [`FaultReporter::is_set`]
//! to decide whether to shut down and exit with [`crate::kernel::ExitCode::RuntimeCrash`].

use std::sync::Mutex;

use tracing::error;

use crate::errors::NumeriError;

/// Latches the first fatal error reported by any plugin. Non-fatal errors
/// passed to [`FaultReporter::report`] are logged by the caller already
/// and are not latched here — only [`NumeriError::is_fatal`] errors are.
#[derive(Default)]
pub struct FaultReporter {
    fault: Mutex<Option<NumeriError>>,
}

impl FaultReporter {
    pub fn new() -> Self {
        Self {
            fault: Mutex::new(None),
        }
    }

    /// Records `err` if it is fatal and none has been latched yet. Safe to
    /// call from any plugin's `execute` thread.
    pub fn report(&self, component: &str, err: NumeriError) {
        if !err.is_fatal() {
            return;
        }
        let mut guard = self.fault.lock().unwrap();
        if guard.is_none() {
            error!(component, error = %err, "fatal invariant violation reported");
            *guard = Some(err);
        }
    }

    /// Whether a fatal fault has been latched.
    pub fn is_set(&self) -> bool {
        self.fault.lock().unwrap().is_some()
    }

    /// Takes the latched fault, if any, leaving the reporter clear.
    pub fn take(&self) -> Option<NumeriError> {
        self.fault.lock().unwrap().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_fatal_errors_are_not_latched() {
        let reporter = FaultReporter::new();
        reporter.report(
            "ingestor",
            NumeriError::TransientIo {
                component: "net".to_string(),
                reason: "timed out".to_string(),
            },
        );
        assert!(!reporter.is_set());
    }

    #[test]
    fn fatal_error_is_latched_and_only_the_first_is_kept() {
        let reporter = FaultReporter::new();
        reporter.report(
            "ingestor",
            NumeriError::InvariantViolation {
                component: "orderbook".to_string(),
                reason: "book crossed".to_string(),
            },
        );
        assert!(reporter.is_set());

        reporter.report(
            "ingestor",
            NumeriError::InvariantViolation {
                component: "orderbook".to_string(),
                reason: "second violation".to_string(),
            },
        );
        let taken = reporter.take().unwrap();
        assert!(matches!(
            taken,
            NumeriError::InvariantViolation { reason, .. } if reason == "book crossed"
        ));
        assert!(!reporter.is_set());
    }
}
