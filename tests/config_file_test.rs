// Integration test for configuration file support

use std::fs;
use streamtail::config::TailConfig;
use streamtail::error::TailError;
use tempfile::TempDir;

#[test]
fn test_load_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("streamtail.toml");

    let toml_content = r#"
        log_group = "/aws/eks/prod-cluster"
        filter = "worker"
        since = "1h"
        region = "eu-west-1"
    "#;

    fs::write(&config_path, toml_content).unwrap();

    let config = TailConfig::from_file(&config_path).unwrap();
    assert_eq!(config.log_group, "/aws/eks/prod-cluster");
    assert_eq!(config.filter, "worker");
    assert_eq!(config.since, "1h");
    assert_eq!(config.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.lookback().unwrap().duration().num_minutes(), 60);
}

#[test]
fn test_load_json_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("streamtail.json");

    let json_content = r#"{ "filter": "api", "since": "15m" }"#;
    fs::write(&config_path, json_content).unwrap();

    let config = TailConfig::from_file(&config_path).unwrap();
    assert_eq!(config.filter, "api");
    assert_eq!(config.since, "15m");
    assert_eq!(config.log_group, TailConfig::default().log_group);
    assert_eq!(config.region, None);
}

#[test]
fn test_invalid_lookback_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("streamtail.toml");

    fs::write(&config_path, "since = \"yesterday\"\n").unwrap();

    let result = TailConfig::from_file(&config_path);
    assert!(matches!(result, Err(TailError::ConfigError(_))));
}

#[test]
fn test_malformed_toml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("streamtail.toml");

    fs::write(&config_path, "filter = [unclosed\n").unwrap();

    let result = TailConfig::from_file(&config_path);
    assert!(matches!(result, Err(TailError::InvalidConfig(_))));
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = TailConfig::from_file(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(TailError::ConfigError(_))));
}
