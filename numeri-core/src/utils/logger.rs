use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the process-wide tracing subscriber.
///
/// `RUST_LOG` (or any env filter, if set) wins over `log_level`. Plain
/// text output by default; `json_logs` switches to one JSON object per
/// line, for log aggregators that parse structured fields.
pub fn init_logger(log_level: &str, json_logs: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }
}
