// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status sink trait for surfacing agent health to the UI layer.

use crate::types::AgentStatus;

/// Receives agent status transitions. Fire-and-forget: no return value,
/// no error path. Rendering is the embedding application's concern.
pub trait StatusSink: Send + Sync {
    /// Record a status transition.
    fn update_status(&self, status: AgentStatus);
}
