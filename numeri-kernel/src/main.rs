//! The numeri Kernel binary.
//!
//! Loads config from `NUMERI_CONFIG_PATH` (or `--config`), starts the
//! Kernel, runs until a shutdown signal, then stops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use numeri_core::kernel::{ExitCode, Kernel};
use numeri_core::utils::logger::init_logger;

#[derive(Parser, Debug)]
#[command(author, version, about = "numeri market-data and trading kernel")]
struct Args {
    /// Path to the JSON config file. Falls back to NUMERI_CONFIG_PATH.
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit structured JSON logs instead of plain text.
    #[arg(long)]
    json_logs: bool,
}

fn main() {
    let args = Args::parse();
    init_logger(&args.log_level, args.json_logs);

    let config_path = match args.config.or_else(|| std::env::var(numeri_core::config::CONFIG_PATH_ENV).ok()) {
        Some(path) => path,
        None => {
            tracing::error!(
                "no config path given: pass --config or set {}",
                numeri_core::config::CONFIG_PATH_ENV
            );
            std::process::exit(ExitCode::ConfigurationError.code());
        }
    };

    let mut kernel = match Kernel::load(config_path) {
        Ok(kernel) => kernel,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(ExitCode::for_start_error(&e).code());
        }
    };

    if let Err(e) = kernel.start() {
        tracing::error!(error = %e, "fatal error starting kernel");
        kernel.stop();
        std::process::exit(ExitCode::for_start_error(&e).code());
    }

    tracing::info!("numeri kernel running, press Ctrl-C to stop");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            tracing::warn!("received shutdown signal");
            shutdown.store(true, Ordering::Release);
        }) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    loop {
        if shutdown.load(Ordering::Acquire) {
            break;
        }
        if kernel.has_fatal_fault() {
            tracing::error!("fatal invariant violation reported, shutting down");
            kernel.stop();
            std::process::exit(ExitCode::RuntimeCrash.code());
        }
        std::thread::sleep(std::time::Duration::from_millis(200));
    }

    kernel.stop();
    tracing::info!("numeri kernel stopped");
    std::process::exit(ExitCode::Normal.code());
}
