// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Harbor resilience layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier of a conversation endpoint (e.g., a phone number).
///
/// Used both for the sender of a queued message and for the configured
/// owner addresses that receive offline/online notices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

/// Unique identifier for a queued message. Assigned at creation, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// The kind of network interface currently carrying traffic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionKind {
    Wifi,
    Cellular,
    WiredEthernet,
    Other,
    None,
}

/// A snapshot of host network reachability.
///
/// The `connected` flag and `kind` are always updated together; readers
/// never observe a half-updated pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityState {
    pub connected: bool,
    pub kind: ConnectionKind,
}

impl Default for ConnectivityState {
    /// Optimistic pre-observation default: assume connected so that process
    /// startup is not spuriously treated as an offline episode.
    fn default() -> Self {
        Self {
            connected: true,
            kind: ConnectionKind::Other,
        }
    }
}

/// Agent status vocabulary consumed by the status sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentStatus {
    Starting,
    Healthy,
    Degraded,
    Error,
    Offline,
}

/// The unit of persisted work: a message deferred for later processing.
///
/// Immutable except for `retry_count`, which the recovery coordinator
/// increments on each failed processing attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Address,
    /// Timestamp of original receipt, not of enqueue or retry.
    pub received_at: DateTime<Utc>,
    pub retry_count: u32,
}

impl QueuedMessage {
    /// Create a new queued message with a fresh id, the current receipt
    /// time, and a zero retry count.
    pub fn new(text: impl Into<String>, sender: Address) -> Self {
        Self {
            id: MessageId(uuid::Uuid::new_v4().to_string()),
            text: text.into(),
            sender,
            received_at: Utc::now(),
            retry_count: 0,
        }
    }
}
