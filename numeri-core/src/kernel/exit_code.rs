//! Process exit codes.

/// Maps onto the four outcomes the kernel binary can report to its shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Normal = 0,
    ConfigurationError = 1,
    FatalPluginLoadError = 2,
    RuntimeCrash = 3,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Classifies an error raised during [`super::Kernel::load`] or
    /// [`super::Kernel::start`] into the exit code the binary should use.
    pub fn for_start_error(err: &crate::errors::NumeriError) -> ExitCode {
        use crate::errors::NumeriError;
        match err {
            NumeriError::Configuration(_) => ExitCode::ConfigurationError,
            NumeriError::PluginLoad { .. } | NumeriError::PluginInit { .. } => {
                ExitCode::FatalPluginLoadError
            }
            _ => ExitCode::RuntimeCrash,
        }
    }
}
