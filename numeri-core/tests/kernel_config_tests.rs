//! Config loading/validation, and hot-reload through `ConfigWatcher`'s
//! public API only (`spawn`/`current`/`stop`, timed against `POLL_INTERVAL`).

use std::io::Write;
use std::time::Duration;

use numeri_core::config::{Config, ConfigWatcher, POLL_INTERVAL};
use numeri_core::errors::NumeriError;

fn write_temp(json: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

const VALID: &str = r#"{
    "metadata": {
        "l2_broadcast_buffer": 1024,
        "metrics_buffer": 1024,
        "order_buffer": 1024,
        "fill_buffer": 1024
    },
    "data_sources": [
        {"name": "l2", "file": "plugins/libl2_ingestor.so", "params": {"symbol": "BTC-USD"}}
    ],
    "algorithms": [
        {"name": "algo1", "file": "plugins/libalgorithm1.so", "params": {}}
    ],
    "execution_engines": []
}"#;

#[test]
fn loads_a_valid_config() {
    let file = write_temp(VALID);
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.metadata.l2_broadcast_buffer, 1024);
    assert_eq!(config.data_sources.len(), 1);
}

#[test]
fn missing_file_is_configuration_error() {
    let err = Config::load("/nonexistent/config.json").unwrap_err();
    assert!(matches!(err, NumeriError::Configuration(_)));
}

#[test]
fn malformed_json_is_configuration_error() {
    let file = write_temp("{ not json");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, NumeriError::Configuration(_)));
}

#[test]
fn zero_capacity_fails_validation() {
    let file = write_temp(
        r#"{"metadata": {"l2_broadcast_buffer": 0, "metrics_buffer": 1, "order_buffer": 1, "fill_buffer": 1}}"#,
    );
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, NumeriError::Configuration(_)));
}

#[test]
fn duplicate_ingestor_symbol_fails_validation() {
    let file = write_temp(
        r#"{
            "metadata": {"l2_broadcast_buffer": 1, "metrics_buffer": 1, "order_buffer": 1, "fill_buffer": 1},
            "data_sources": [
                {"name": "a", "file": "a.so", "params": {"symbol": "BTC-USD"}},
                {"name": "b", "file": "b.so", "params": {"symbol": "BTC-USD"}}
            ]
        }"#,
    );
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, NumeriError::Configuration(_)));
}

const BASE: &str = r#"{"metadata": {"l2_broadcast_buffer": 1, "metrics_buffer": 1, "order_buffer": 1, "fill_buffer": 1}}"#;

#[test]
fn picks_up_a_newer_config_on_poll() {
    let file = write_temp(BASE);
    let initial = Config::load(file.path()).unwrap();
    let watcher = ConfigWatcher::new(file.path(), initial);
    let handle = watcher.spawn();

    // Wait past the watcher's own mtime baseline before writing, so the
    // new mtime is unambiguously later, then past one poll interval.
    std::thread::sleep(Duration::from_millis(50));
    let updated =
        r#"{"metadata": {"l2_broadcast_buffer": 42, "metrics_buffer": 1, "order_buffer": 1, "fill_buffer": 1}}"#;
    std::fs::write(file.path(), updated).unwrap();
    std::thread::sleep(POLL_INTERVAL + Duration::from_secs(1));

    assert_eq!(watcher.current().metadata.l2_broadcast_buffer, 42);

    watcher.stop();
    handle.join().unwrap();
}

#[test]
fn retains_previous_config_on_parse_failure() {
    let file = write_temp(BASE);
    let initial = Config::load(file.path()).unwrap();
    let watcher = ConfigWatcher::new(file.path(), initial);
    let handle = watcher.spawn();

    std::thread::sleep(Duration::from_millis(50));
    std::fs::write(file.path(), "{ not json").unwrap();
    std::thread::sleep(POLL_INTERVAL + Duration::from_secs(1));

    assert_eq!(watcher.current().metadata.l2_broadcast_buffer, 1);

    watcher.stop();
    handle.join().unwrap();
}
