// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network reachability monitoring for the Harbor resilience layer.
//!
//! [`ConnectivityMonitor`] turns raw path updates from a swappable
//! [`PathSource`] into a live, deduplicated, thread-safe view of host
//! reachability. Production deployments use [`TcpProbeSource`]; platform
//! integrations and tests supply their own sources.

mod monitor;
mod source;

pub use monitor::ConnectivityMonitor;
pub use source::{InterfaceKind, PathSource, PathUpdate, TcpProbeSource};
