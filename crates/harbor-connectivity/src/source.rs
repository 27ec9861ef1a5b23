// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path sources: the swappable stand-in for the OS reachability primitive.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::debug;

use harbor_config::model::ConnectivityConfig;

/// The kind of interface a path update reports as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Wifi,
    Cellular,
    WiredEthernet,
    Other,
}

/// One raw observation of the network path.
#[derive(Debug, Clone)]
pub struct PathUpdate {
    /// Whether the network is currently reachable.
    pub reachable: bool,
    /// Active interface kinds, unordered. Empty when unreachable.
    pub interfaces: Vec<InterfaceKind>,
}

/// A stream of raw path observations.
///
/// Implementations wrap whatever reachability primitive the platform
/// offers: a periodic probe, an OS path-monitor callback bridge, or a test
/// script. Returning `None` means the source is exhausted and the monitor
/// stops observing.
#[async_trait]
pub trait PathSource: Send {
    /// The next path observation, or `None` when the source is closed.
    async fn next_update(&mut self) -> Option<PathUpdate>;
}

/// A portable production [`PathSource`]: probes a TCP endpoint on a fixed
/// interval with a connect timeout.
///
/// Portable Rust has no interface-type introspection, so reachable updates
/// report [`InterfaceKind::Other`]. Platform-specific sources can implement
/// [`PathSource`] themselves and report real kinds.
pub struct TcpProbeSource {
    host: String,
    port: u16,
    probe_interval: Duration,
    timeout: Duration,
    ticker: Option<Interval>,
}

impl TcpProbeSource {
    /// Create a probe source against the given endpoint.
    pub fn new(host: impl Into<String>, port: u16, probe_interval: Duration, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            probe_interval,
            timeout,
            ticker: None,
        }
    }

    /// Create a probe source from the connectivity config section.
    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self::new(
            config.probe_host.clone(),
            config.probe_port,
            Duration::from_millis(config.probe_interval_ms),
            Duration::from_millis(config.probe_timeout_ms),
        )
    }
}

#[async_trait]
impl PathSource for TcpProbeSource {
    async fn next_update(&mut self) -> Option<PathUpdate> {
        // First tick completes immediately, so the monitor gets an initial
        // observation right after start.
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut t = interval(self.probe_interval);
            t.set_missed_tick_behavior(MissedTickBehavior::Delay);
            t
        });
        ticker.tick().await;

        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let reachable = matches!(tokio::time::timeout(self.timeout, connect).await, Ok(Ok(_)));
        debug!(host = %self.host, port = self.port, reachable, "connectivity probe");

        let interfaces = if reachable {
            vec![InterfaceKind::Other]
        } else {
            Vec::new()
        };
        Some(PathUpdate {
            reachable,
            interfaces,
        })
    }
}
