// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message processor trait: the hook into the real processing pipeline.

use async_trait::async_trait;

use crate::error::HarborError;
use crate::types::Address;

/// The host application's message-processing entry point.
///
/// Covers content screening, prompt construction, LLM invocation, and reply
/// delivery -- none of which Harbor implements. The coordinator treats the
/// boolean result as success/failure and an `Err` exactly like `Ok(false)`;
/// it never inspects *why* an attempt failed beyond logging it.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    /// Attempt to fully process one message. Returns `Ok(true)` on success.
    async fn process(&self, text: &str, sender: &Address) -> Result<bool, HarborError>;
}
