//! Integration tests for `authlog config` command.
//!
//! Tests config validation and display functionality with real TOML files.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn authlog() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authlog"));
    cmd.env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("AUTHLOG_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

#[tokio::test]
async fn test_config_load_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("authlog.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[classifier]
on_malformed = "skip"

[output]
limit = 25
color = false
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let config = authlog_core::config::AuthlogConfig::from_file(&config_path)
        .await
        .expect("valid config should load successfully");

    // Then: Values are applied, omitted sections fall back to defaults
    assert_eq!(config.classifier.on_malformed, "skip");
    assert_eq!(config.output.limit, 25);
    assert!(config.source.require_log_extension);
}

#[tokio::test]
async fn test_config_load_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write config");

    let result = authlog_core::config::AuthlogConfig::from_file(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[test]
fn test_config_validate_defaults() {
    let output = authlog()
        .args(["config", "validate"])
        .output()
        .expect("run authlog");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("VALID"));
    assert!(stdout.contains("defaults"));
}

#[test]
fn test_config_validate_invalid_value_exits_2() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("authlog.toml");
    fs::write(&config_path, "[classifier]\non_malformed = \"retry\"\n").expect("write config");

    let output = authlog()
        .args(["config", "validate", "--no-color", "--config"])
        .arg(&config_path)
        .output()
        .expect("run authlog");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("INVALID"));
    assert!(stdout.contains("on_malformed"));
}

#[test]
fn test_config_validate_missing_tables_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("authlog.toml");
    fs::write(
        &config_path,
        "[classifier]\ntables_path = \"/nonexistent/tables.toml\"\n",
    )
    .expect("write config");

    let output = authlog()
        .args(["config", "validate", "--output", "json", "--config"])
        .arg(&config_path)
        .output()
        .expect("run authlog");

    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json validation report");
    assert_eq!(report["valid"], false);
    assert!(report["errors"][0].as_str().unwrap().contains("tables.toml"));
}

#[test]
fn test_config_missing_file_exits_2() {
    let output = authlog()
        .args(["config", "show", "--config", "/nonexistent/authlog.toml"])
        .output()
        .expect("run authlog");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"));
}

#[test]
fn test_config_show_section_with_env_override() {
    let output = authlog()
        .args(["config", "show", "--no-color", "--section", "output"])
        .env("AUTHLOG_OUTPUT_LIMIT", "42")
        .output()
        .expect("run authlog");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[output]"));
    assert!(stdout.contains("limit = 42"));
}
