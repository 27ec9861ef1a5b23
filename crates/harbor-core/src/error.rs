// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Harbor resilience layer.

use thiserror::Error;

/// The primary error type used across Harbor collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum HarborError {
    /// Configuration errors (invalid TOML, missing required fields, bad tunables).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable queue storage errors (file I/O, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Message processor errors (the host pipeline failed outright).
    #[error("processor error: {message}")]
    Processor {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Notifier errors (an offline/online notice could not be delivered).
    #[error("notifier error: {message}")]
    Notifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
