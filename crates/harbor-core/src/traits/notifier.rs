// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier trait for delivering outbound status notices to the user.

use async_trait::async_trait;

use crate::error::HarborError;
use crate::types::Address;

/// Delivers outbound text to a conversation endpoint.
///
/// A send failure must never prevent queuing or draining from proceeding;
/// callers log and swallow errors from this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` to the given address.
    async fn send(&self, text: &str, to: &Address) -> Result<(), HarborError>;
}
