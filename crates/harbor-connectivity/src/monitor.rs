// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The connectivity monitor: one background task, one atomic state pair,
//! deduplicated change delivery.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use harbor_core::{ConnectionKind, Connectivity, ConnectivityState, HarborError};

use crate::source::{InterfaceKind, PathSource, PathUpdate};

/// State shared between the monitor handle and its background task.
struct Shared {
    /// The atomically swapped `(connected, kind)` pair. Readers never see
    /// one half updated without the other.
    state: ArcSwap<ConnectivityState>,
    /// Change notifications, sent only when the connected bool flips.
    tx: watch::Sender<ConnectivityState>,
}

/// Observes host network reachability through a [`PathSource`] and exposes
/// a deduplicated connected/disconnected signal.
///
/// All state writes happen on the single background task spawned by
/// [`start`](Connectivity::start); readers go through the lock-free
/// accessors. Before the first observation arrives the monitor reports the
/// optimistic default (`connected`, kind [`ConnectionKind::Other`]) so that
/// process launch is not mistaken for an offline episode.
pub struct ConnectivityMonitor {
    shared: Arc<Shared>,
    /// Consumed by `start`. A monitor cannot be restarted once stopped;
    /// construct a new instance instead.
    source: Mutex<Option<Box<dyn PathSource>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    /// Keeps the watch channel alive while no external subscriber exists.
    _seed_rx: watch::Receiver<ConnectivityState>,
}

impl ConnectivityMonitor {
    /// Create a monitor over the given path source. Observation does not
    /// begin until `start` is called.
    pub fn new(source: Box<dyn PathSource>) -> Self {
        let initial = ConnectivityState::default();
        let (tx, seed_rx) = watch::channel(initial);
        Self {
            shared: Arc::new(Shared {
                state: ArcSwap::from_pointee(initial),
                tx,
            }),
            source: Mutex::new(Some(source)),
            task: Mutex::new(None),
            cancel: CancellationToken::new(),
            _seed_rx: seed_rx,
        }
    }

    /// Derive the reported connection kind from a path update.
    ///
    /// Interface kinds are checked in priority order (wifi, cellular,
    /// wired, other); an unreachable path always reports `None`.
    fn derive_kind(update: &PathUpdate) -> ConnectionKind {
        if !update.reachable {
            return ConnectionKind::None;
        }
        if update.interfaces.contains(&InterfaceKind::Wifi) {
            ConnectionKind::Wifi
        } else if update.interfaces.contains(&InterfaceKind::Cellular) {
            ConnectionKind::Cellular
        } else if update.interfaces.contains(&InterfaceKind::WiredEthernet) {
            ConnectionKind::WiredEthernet
        } else {
            ConnectionKind::Other
        }
    }

    /// The observation loop: translate each path update into a state pair,
    /// store it atomically, and notify subscribers on connected-bool flips.
    async fn observe(shared: Arc<Shared>, mut source: Box<dyn PathSource>, cancel: CancellationToken) {
        loop {
            let update = tokio::select! {
                _ = cancel.cancelled() => break,
                update = source.next_update() => update,
            };
            let Some(update) = update else {
                debug!("path source exhausted, monitor stopping");
                break;
            };

            let next = ConnectivityState {
                connected: update.reachable,
                kind: Self::derive_kind(&update),
            };
            let prev = **shared.state.load();
            shared.state.store(Arc::new(next));

            // Kind-only changes update the accessors but are not delivered;
            // subscribers only care about the connected bool.
            if prev.connected != next.connected {
                info!(
                    connected = next.connected,
                    kind = %next.kind,
                    "connectivity changed"
                );
                let _ = shared.tx.send(next);
            }
        }
    }
}

#[async_trait]
impl Connectivity for ConnectivityMonitor {
    async fn start(&self) -> Result<(), HarborError> {
        let mut task = self.task.lock().await;
        if task.is_some() {
            // Already running.
            return Ok(());
        }
        let Some(source) = self.source.lock().await.take() else {
            // "No signal yet" is never an error; a stopped monitor simply
            // stays on its last observed state.
            warn!("monitor already stopped, construct a new instance to restart");
            return Ok(());
        };
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        *task = Some(tokio::spawn(Self::observe(shared, source, cancel)));
        debug!("connectivity monitor started");
        Ok(())
    }

    async fn stop(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.task.lock().await.take() {
            let _ = handle.await;
            debug!("connectivity monitor stopped");
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.state.load().connected
    }

    fn connection_kind(&self) -> ConnectionKind {
        self.shared.state.load().kind
    }

    fn state(&self) -> ConnectivityState {
        **self.shared.state.load()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.shared.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// A path source fed by an mpsc channel of scripted updates.
    struct ScriptedSource {
        rx: mpsc::Receiver<PathUpdate>,
    }

    #[async_trait]
    impl PathSource for ScriptedSource {
        async fn next_update(&mut self) -> Option<PathUpdate> {
            self.rx.recv().await
        }
    }

    fn scripted() -> (mpsc::Sender<PathUpdate>, ConnectivityMonitor) {
        let (tx, rx) = mpsc::channel(16);
        let monitor = ConnectivityMonitor::new(Box::new(ScriptedSource { rx }));
        (tx, monitor)
    }

    fn up(interfaces: Vec<InterfaceKind>) -> PathUpdate {
        PathUpdate {
            reachable: true,
            interfaces,
        }
    }

    fn down() -> PathUpdate {
        PathUpdate {
            reachable: false,
            interfaces: vec![],
        }
    }

    #[test]
    fn kind_priority_wifi_over_cellular() {
        let update = up(vec![InterfaceKind::Cellular, InterfaceKind::Wifi]);
        assert_eq!(
            ConnectivityMonitor::derive_kind(&update),
            ConnectionKind::Wifi
        );
    }

    #[test]
    fn kind_priority_cellular_over_wired() {
        let update = up(vec![InterfaceKind::WiredEthernet, InterfaceKind::Cellular]);
        assert_eq!(
            ConnectivityMonitor::derive_kind(&update),
            ConnectionKind::Cellular
        );
    }

    #[test]
    fn unreachable_is_kind_none() {
        assert_eq!(
            ConnectivityMonitor::derive_kind(&down()),
            ConnectionKind::None
        );
    }

    #[test]
    fn reachable_without_known_interfaces_is_other() {
        let update = up(vec![]);
        assert_eq!(
            ConnectivityMonitor::derive_kind(&update),
            ConnectionKind::Other
        );
    }

    #[tokio::test]
    async fn optimistic_default_before_first_observation() {
        let (_tx, monitor) = scripted();
        assert!(monitor.is_connected());
        assert_eq!(monitor.connection_kind(), ConnectionKind::Other);
    }

    #[tokio::test]
    async fn disconnect_is_delivered_to_subscribers() {
        let (tx, monitor) = scripted();
        monitor.start().await.unwrap();
        let mut rx = monitor.subscribe();

        tx.send(down()).await.unwrap();
        rx.changed().await.unwrap();
        let state = *rx.borrow_and_update();
        assert!(!state.connected);
        assert_eq!(state.kind, ConnectionKind::None);
        assert!(!monitor.is_connected());

        monitor.stop().await;
    }

    #[tokio::test]
    async fn repeated_connected_updates_are_deduplicated() {
        let (tx, monitor) = scripted();
        monitor.start().await.unwrap();
        let mut rx = monitor.subscribe();

        // Still connected: no notification, but the kind accessor updates.
        tx.send(up(vec![InterfaceKind::Wifi])).await.unwrap();
        tx.send(up(vec![InterfaceKind::Cellular])).await.unwrap();

        let notified =
            tokio::time::timeout(Duration::from_millis(100), rx.changed()).await;
        assert!(notified.is_err(), "no flip means no delivery");
        assert!(monitor.is_connected());
        assert_eq!(monitor.connection_kind(), ConnectionKind::Cellular);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn flap_delivers_both_transitions() {
        let (tx, monitor) = scripted();
        monitor.start().await.unwrap();
        let mut rx = monitor.subscribe();

        tx.send(down()).await.unwrap();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().connected);

        tx.send(up(vec![InterfaceKind::Wifi])).await.unwrap();
        rx.changed().await.unwrap();
        let state = *rx.borrow_and_update();
        assert!(state.connected);
        assert_eq!(state.kind, ConnectionKind::Wifi);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let (tx, monitor) = scripted();
        monitor.start().await.unwrap();
        monitor.start().await.unwrap();

        let mut rx = monitor.subscribe();
        tx.send(down()).await.unwrap();
        rx.changed().await.unwrap();
        assert!(!monitor.is_connected());

        monitor.stop().await;
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_start_after_stop_is_noop() {
        let (_tx, monitor) = scripted();
        monitor.start().await.unwrap();
        monitor.stop().await;
        monitor.stop().await;
        // Restart requires a new instance; this must not panic or spin.
        monitor.start().await.unwrap();
        assert!(monitor.is_connected(), "last observed state is retained");
    }

    #[tokio::test]
    async fn source_exhaustion_stops_observation() {
        let (tx, monitor) = scripted();
        monitor.start().await.unwrap();
        let mut rx = monitor.subscribe();
        tx.send(down()).await.unwrap();
        rx.changed().await.unwrap();

        drop(tx);
        // The task exits on its own; stop still joins cleanly.
        monitor.stop().await;
        assert!(!monitor.is_connected());
    }
}
