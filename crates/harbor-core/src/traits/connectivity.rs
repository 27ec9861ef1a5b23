// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connectivity trait abstracting the platform reachability monitor.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::HarborError;
use crate::types::{ConnectionKind, ConnectivityState};

/// A live, deduplicated view of host network reachability.
///
/// Implementations own the underlying reachability primitive (an OS path
/// monitor, a periodic probe, or a test script) and expose an atomically
/// consistent `(connected, kind)` pair. Change notifications are delivered
/// through a `watch` channel and only when the connected bool flips.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Begin observation. Idempotent: calling while running is a no-op.
    async fn start(&self) -> Result<(), HarborError>;

    /// End observation and release the underlying primitive. Idempotent.
    async fn stop(&self);

    /// Current reachability. Safe from any caller context.
    fn is_connected(&self) -> bool;

    /// Current interface kind. Updated atomically with `is_connected`.
    fn connection_kind(&self) -> ConnectionKind;

    /// Current state snapshot.
    fn state(&self) -> ConnectivityState;

    /// Subscribe to connectivity changes. The receiver observes the state
    /// at subscription time plus every subsequent connected-bool flip;
    /// identical consecutive states are never delivered.
    fn subscribe(&self) -> watch::Receiver<ConnectivityState>;
}
