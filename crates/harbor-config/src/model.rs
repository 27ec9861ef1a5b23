// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Harbor resilience layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The resilience tunables (queue capacity, retry
//! ceiling, drain pacing) live here rather than as hardcoded constants.

use serde::{Deserialize, Serialize};

/// Top-level Harbor configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HarborConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Persistent queue settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Recovery coordinator settings.
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Connectivity probe settings.
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "harbor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Persistent queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Directory holding the queue file. Application-private.
    #[serde(default = "default_queue_dir")]
    pub dir: String,

    /// Maximum number of messages held; the oldest is evicted beyond this.
    /// 50 bounds disk/memory usage across outages lasting days.
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            dir: default_queue_dir(),
            capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("harbor"))
        .unwrap_or_else(|| std::path::PathBuf::from(".harbor"))
        .display()
        .to_string()
}

fn default_queue_capacity() -> usize {
    50
}

/// Recovery coordinator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecoveryConfig {
    /// Processing attempts per message before it is dropped permanently.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between drained messages, so a just-recovered backend is not
    /// hit with the whole backlog at once.
    #[serde(default = "default_drain_delay_ms")]
    pub drain_delay_ms: u64,

    /// Conversation addresses that receive offline/online notices.
    #[serde(default)]
    pub owner_addresses: Vec<String>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            drain_delay_ms: default_drain_delay_ms(),
            owner_addresses: Vec::new(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_drain_delay_ms() -> u64 {
    2000
}

/// Connectivity probe configuration for the default TCP path source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectivityConfig {
    /// Host probed to judge reachability.
    #[serde(default = "default_probe_host")]
    pub probe_host: String,

    /// Port probed on `probe_host`.
    #[serde(default = "default_probe_port")]
    pub probe_port: u16,

    /// Interval between probes, in milliseconds.
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,

    /// Per-probe connect timeout, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_host: default_probe_host(),
            probe_port: default_probe_port(),
            probe_interval_ms: default_probe_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_probe_host() -> String {
    "1.1.1.1".to_string()
}

fn default_probe_port() -> u16 {
    443
}

fn default_probe_interval_ms() -> u64 {
    15_000
}

fn default_probe_timeout_ms() -> u64 {
    3_000
}
