// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and validation.

use harbor_config::{load_and_validate_str, load_config_from_str, ConfigError, HarborConfig};

#[test]
fn empty_config_yields_defaults() {
    let config = load_config_from_str("").expect("empty config should load");
    assert_eq!(config.agent.name, "harbor");
    assert_eq!(config.queue.capacity, 50);
    assert_eq!(config.recovery.max_retries, 3);
    assert_eq!(config.recovery.drain_delay_ms, 2000);
    assert!(config.recovery.owner_addresses.is_empty());
    assert_eq!(config.connectivity.probe_port, 443);
}

#[test]
fn toml_overrides_section_values() {
    let toml = r#"
[queue]
capacity = 10
dir = "/tmp/harbor-test"

[recovery]
max_retries = 5
drain_delay_ms = 100
owner_addresses = ["+15551234567"]
"#;
    let config = load_config_from_str(toml).expect("valid config should load");
    assert_eq!(config.queue.capacity, 10);
    assert_eq!(config.queue.dir, "/tmp/harbor-test");
    assert_eq!(config.recovery.max_retries, 5);
    assert_eq!(config.recovery.drain_delay_ms, 100);
    assert_eq!(config.recovery.owner_addresses, vec!["+15551234567"]);
    // Untouched sections keep defaults.
    assert_eq!(config.agent.log_level, "info");
}

#[test]
fn unknown_key_is_rejected() {
    let toml = r#"
[queue]
capacty = 10
"#;
    let result = toml::from_str::<HarborConfig>(toml);
    assert!(result.is_err(), "misspelled key must be rejected");
}

#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telemetry]
enabled = true
"#;
    let result = toml::from_str::<HarborConfig>(toml);
    assert!(result.is_err(), "unknown section must be rejected");
}

#[test]
fn validation_catches_zero_capacity() {
    let toml = r#"
[queue]
capacity = 0
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("capacity"))));
}

#[test]
fn validation_catches_empty_probe_host() {
    let toml = r#"
[connectivity]
probe_host = ""
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("probe_host"))));
}

#[test]
fn parse_error_renders_as_diagnostic() {
    let errors = load_and_validate_str("queue = \"not a table\"").unwrap_err();
    assert!(!errors.is_empty());
    let rendered = harbor_config::render_errors(&errors);
    assert!(rendered.contains("configuration"));
}
