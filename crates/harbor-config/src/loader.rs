// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./harbor.toml` > `~/.config/harbor/harbor.toml` with
//! environment variable overrides via `HARBOR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HarborConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/harbor/harbor.toml` (user XDG config)
/// 3. `./harbor.toml` (local directory)
/// 4. `HARBOR_*` environment variables
pub fn load_config() -> Result<HarborConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HarborConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("harbor/harbor.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("harbor.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<HarborConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HarborConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HarborConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HarborConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HARBOR_RECOVERY_MAX_RETRIES` must map
/// to `recovery.max_retries`, not `recovery.max.retries`.
fn env_provider() -> Env {
    Env::prefixed("HARBOR_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("recovery_", "recovery.", 1)
            .replacen("connectivity_", "connectivity.", 1);
        mapped.into()
    })
}
