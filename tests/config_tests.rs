// Configuration loading, persistence and validation

mod common;

use common::create_test_config;
use tempfile::TempDir;
use trade_cost_simulator::{ConfigError, SimulatorConfig};

#[test]
fn test_default_config_validates() {
    assert!(SimulatorConfig::default().validate().is_ok());
}

#[test]
fn test_config_round_trip() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("config.toml");

    let config = create_test_config();
    config.to_file(&path).expect("write config");

    let loaded = SimulatorConfig::from_file(&path).expect("read config");
    assert_eq!(loaded.feed.ws_url, config.feed.ws_url);
    assert_eq!(loaded.feed.symbol, config.feed.symbol);
    assert_eq!(loaded.feed.channel_capacity, config.feed.channel_capacity);
    assert_eq!(loaded.simulation.base_url, config.simulation.base_url);
    assert_eq!(loaded.latency.sample_capacity, config.latency.sample_capacity);
}

#[test]
fn test_load_or_create_writes_default() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("fresh.toml");

    assert!(!path.exists());
    let config = SimulatorConfig::load_or_create(&path).expect("create default");
    assert!(path.exists());
    assert_eq!(config.feed.symbol, SimulatorConfig::default().feed.symbol);

    // Second load reads the file it just wrote
    let reloaded = SimulatorConfig::load_or_create(&path).expect("reload");
    assert_eq!(reloaded.feed.ws_url, config.feed.ws_url);
}

#[test]
fn test_missing_file_is_read_error() {
    let err = SimulatorConfig::from_file("/nonexistent/nowhere.toml").unwrap_err();
    assert!(matches!(err, ConfigError::FileRead(_)));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "feed = not valid toml [[").expect("write");

    let err = SimulatorConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_validation_failures_reject_load() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("zero-cap.toml");

    let mut config = create_test_config();
    config.latency.sample_capacity = 0;
    config.to_file(&path).expect("write config");

    let err = SimulatorConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}
