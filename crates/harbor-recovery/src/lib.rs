// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery coordination for the Harbor resilience layer.
//!
//! [`RecoveryCoordinator`] is the state machine that turns connectivity
//! signals and queue contents into user-visible behavior: it defers
//! messages while offline, tells the affected conversations exactly once
//! per offline episode, and drains the backlog through the injected
//! processing pipeline when connectivity returns.

mod coordinator;

pub use coordinator::{RecoveryCoordinator, OFFLINE_NOTICE, ONLINE_NOTICE};
