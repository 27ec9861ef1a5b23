// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the Harbor resilience layer.
//!
//! The recovery coordinator consumes its external collaborators (the
//! processing pipeline, the outbound notifier, the status sink, and the
//! connectivity monitor) exclusively through these seams, so production
//! and test implementations are interchangeable.

pub mod connectivity;
pub mod notifier;
pub mod processor;
pub mod status;

// Re-export all traits at the traits module level for convenience.
pub use connectivity::Connectivity;
pub use notifier::Notifier;
pub use processor::MessageProcessor;
pub use status::StatusSink;
