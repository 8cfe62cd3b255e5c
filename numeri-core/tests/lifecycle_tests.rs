//! Kernel start/stop lifecycle: prompt shutdown with no plugins, and the
//! fatal-fault latch surfacing a plugin-reported invariant violation.

use std::io::Write;
use std::time::{Duration, Instant};

use numeri_core::errors::NumeriError;
use numeri_core::kernel::Kernel;
use numeri_core::model::Side;
use numeri_core::orderbook::{BookUpdate, OrderBook};

const EMPTY_CONFIG: &str = r#"{
    "metadata": {
        "l2_broadcast_buffer": 8,
        "metrics_buffer": 8,
        "order_buffer": 8,
        "fill_buffer": 8
    },
    "data_sources": [],
    "algorithms": [],
    "execution_engines": []
}"#;

fn write_temp(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn start_stop_with_no_plugins_completes_promptly_and_clears_state() {
    let file = write_temp(EMPTY_CONFIG);
    let mut kernel = Kernel::load(file.path()).unwrap();

    kernel.start().unwrap();
    assert_eq!(kernel.worker_count(), 0);
    assert!(!kernel.has_fatal_fault());

    let started = Instant::now();
    kernel.stop();
    // stop() after start() joins all worker threads within T + 30s;
    // with zero plugins there is no declared timeout to wait out at all.
    assert!(started.elapsed() < Duration::from_secs(30));

    assert_eq!(kernel.worker_count(), 0);
}

#[test]
fn fatal_invariant_violation_reported_by_a_plugin_surfaces_on_the_kernel() {
    let file = write_temp(EMPTY_CONFIG);
    let mut kernel = Kernel::load(file.path()).unwrap();
    kernel.start().unwrap();
    assert!(!kernel.has_fatal_fault());

    // Drive a real invariant violation the way an Ingestor's execute
    // loop does, then report it through the exact FaultReporter handle
    // a plugin would have received via PluginConfig at init.
    let fault = kernel.fault_reporter();
    let mut book = OrderBook::new("BTC-USD");
    book.apply(BookUpdate::new(Side::Buy, 100.0, 1.0)).unwrap();
    let err = book
        .apply(BookUpdate::new(Side::Sell, 99.0, 1.0))
        .unwrap_err();
    assert!(matches!(err, NumeriError::InvariantViolation { .. }));
    fault.report("test-ingestor", err);

    assert!(kernel.has_fatal_fault());
    kernel.stop();
}
