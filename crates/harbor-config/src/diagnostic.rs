// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration errors rendered as miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error suitable for terminal rendering via miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to parse or merge the configuration sources.
    #[error("failed to load configuration: {message}")]
    #[diagnostic(
        code(harbor::config::parse),
        help("check harbor.toml for unknown keys or mistyped values")
    )]
    Parse {
        /// Figment's description of the failure.
        message: String,
    },

    /// A well-formed value failed a semantic constraint.
    #[error("validation error: {message}")]
    #[diagnostic(code(harbor::config::validation))]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Parse {
            message: err.to_string(),
        }
    }
}

/// Render a list of config errors to a string for startup failure output.
pub fn render_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
