// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Harbor offline resilience layer.
//!
//! This crate provides the foundational trait definitions, error type, and
//! common types used throughout the Harbor workspace. The connectivity
//! monitor, persistent queue, and recovery coordinator all build on the
//! seams defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HarborError;
pub use types::{
    Address, AgentStatus, ConnectionKind, ConnectivityState, MessageId, QueuedMessage,
};

// Re-export all collaborator traits at crate root.
pub use traits::{Connectivity, MessageProcessor, Notifier, StatusSink};
