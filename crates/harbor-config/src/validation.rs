// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-zero capacities and non-empty addresses.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::HarborConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HarborConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.queue.capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.capacity must be at least 1".to_string(),
        });
    }

    if config.queue.dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "queue.dir must not be empty".to_string(),
        });
    }

    if config.recovery.max_retries == 0 {
        errors.push(ConfigError::Validation {
            message: "recovery.max_retries must be at least 1".to_string(),
        });
    }

    if config.connectivity.probe_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "connectivity.probe_interval_ms must be non-zero".to_string(),
        });
    }

    if config.connectivity.probe_host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "connectivity.probe_host must not be empty".to_string(),
        });
    }

    // Owner addresses must be non-empty and unique.
    let mut seen = HashSet::new();
    for (i, addr) in config.recovery.owner_addresses.iter().enumerate() {
        if addr.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("recovery.owner_addresses[{i}] must not be empty"),
            });
        } else if !seen.insert(addr) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate owner address `{addr}`"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = HarborConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let mut config = HarborConfig::default();
        config.queue.capacity = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("capacity"))));
    }

    #[test]
    fn zero_max_retries_fails_validation() {
        let mut config = HarborConfig::default();
        config.recovery.max_retries = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_retries"))));
    }

    #[test]
    fn duplicate_owner_address_fails_validation() {
        let mut config = HarborConfig::default();
        config.recovery.owner_addresses =
            vec!["+15551234567".to_string(), "+15551234567".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("duplicate"))));
    }

    #[test]
    fn empty_owner_address_fails_validation() {
        let mut config = HarborConfig::default();
        config.recovery.owner_addresses = vec!["  ".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("owner_addresses"))));
    }
}
