// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock collaborators for deterministic, CI-runnable Harbor tests.
//!
//! Every external seam the recovery coordinator consumes has a mock here:
//! a scripted [`MockProcessor`], a recording [`MockNotifier`] with an
//! optional failure mode, a recording [`MockStatusSink`], a manually
//! switchable [`TestConnectivity`], and a [`ScriptedPathSource`] for
//! driving a real `ConnectivityMonitor` from a test.
//!
//! Recorders use plain `std` mutexes so assertions stay synchronous and can
//! be polled from [`wait_until`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use harbor_connectivity::{PathSource, PathUpdate};
use harbor_core::{
    Address, AgentStatus, ConnectionKind, Connectivity, ConnectivityState, HarborError,
    MessageProcessor, Notifier, StatusSink,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|p| p.into_inner())
}

/// A mock processor that pops scripted pass/fail results from a FIFO queue.
///
/// When the script is exhausted the configured default result is returned.
/// Every call is recorded for assertion.
pub struct MockProcessor {
    results: Mutex<VecDeque<Result<bool, ()>>>,
    default: Result<bool, ()>,
    calls: Mutex<Vec<(String, Address)>>,
}

impl MockProcessor {
    /// A processor that always succeeds.
    pub fn succeeding() -> Self {
        Self::scripted(Vec::new(), Ok(true))
    }

    /// A processor that always returns `Ok(false)`.
    pub fn failing() -> Self {
        Self::scripted(Vec::new(), Ok(false))
    }

    /// A processor that always returns an `Err`.
    pub fn erroring() -> Self {
        Self::scripted(Vec::new(), Err(()))
    }

    /// A processor that pops the given results in order, then succeeds.
    pub fn with_results(results: Vec<bool>) -> Self {
        Self::scripted(results.into_iter().map(Ok).collect(), Ok(true))
    }

    fn scripted(script: Vec<Result<bool, ()>>, default: Result<bool, ()>) -> Self {
        Self {
            results: Mutex::new(VecDeque::from(script)),
            default,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// All `(text, sender)` pairs processed so far, in call order.
    pub fn calls(&self) -> Vec<(String, Address)> {
        lock(&self.calls).clone()
    }

    /// Number of processing attempts so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl MessageProcessor for MockProcessor {
    async fn process(&self, text: &str, sender: &Address) -> Result<bool, HarborError> {
        lock(&self.calls).push((text.to_string(), sender.clone()));
        let result = lock(&self.results).pop_front().unwrap_or(self.default);
        result.map_err(|_| HarborError::Processor {
            message: "scripted processor error".to_string(),
            source: None,
        })
    }
}

/// A mock notifier that records every send and can be switched into a
/// failing mode.
pub struct MockNotifier {
    sends: Mutex<Vec<(String, Address)>>,
    failing: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// When failing, every send returns an error (after being recorded).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All `(text, to)` pairs sent so far, in send order.
    pub fn sends(&self) -> Vec<(String, Address)> {
        lock(&self.sends).clone()
    }

    /// Number of sends attempted so far.
    pub fn send_count(&self) -> usize {
        lock(&self.sends).len()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, text: &str, to: &Address) -> Result<(), HarborError> {
        lock(&self.sends).push((text.to_string(), to.clone()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(HarborError::Notifier {
                message: "scripted notifier failure".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

/// A status sink that records every transition.
pub struct MockStatusSink {
    states: Mutex<Vec<AgentStatus>>,
}

impl MockStatusSink {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(Vec::new()),
        }
    }

    /// All recorded transitions, oldest first.
    pub fn recorded(&self) -> Vec<AgentStatus> {
        lock(&self.states).clone()
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<AgentStatus> {
        lock(&self.states).last().copied()
    }
}

impl Default for MockStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for MockStatusSink {
    fn update_status(&self, status: AgentStatus) {
        lock(&self.states).push(status);
    }
}

/// A manually switchable [`Connectivity`] implementation.
///
/// `set_connected` flips the state and delivers a deduplicated watch
/// notification, mirroring the production monitor's contract.
pub struct TestConnectivity {
    tx: watch::Sender<ConnectivityState>,
    _seed_rx: watch::Receiver<ConnectivityState>,
}

impl TestConnectivity {
    pub fn new(connected: bool) -> Self {
        let (tx, seed_rx) = watch::channel(Self::state_for(connected));
        Self {
            tx,
            _seed_rx: seed_rx,
        }
    }

    /// Flip reachability. Identical repeated states are not delivered.
    pub fn set_connected(&self, connected: bool) {
        if self.tx.borrow().connected == connected {
            return;
        }
        let _ = self.tx.send(Self::state_for(connected));
    }

    fn state_for(connected: bool) -> ConnectivityState {
        ConnectivityState {
            connected,
            kind: if connected {
                ConnectionKind::Wifi
            } else {
                ConnectionKind::None
            },
        }
    }
}

#[async_trait]
impl Connectivity for TestConnectivity {
    async fn start(&self) -> Result<(), HarborError> {
        Ok(())
    }

    async fn stop(&self) {}

    fn is_connected(&self) -> bool {
        self.tx.borrow().connected
    }

    fn connection_kind(&self) -> ConnectionKind {
        self.tx.borrow().kind
    }

    fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}

/// A [`PathSource`] fed by an mpsc channel, for driving a real
/// `ConnectivityMonitor` from test code.
pub struct ScriptedPathSource {
    rx: mpsc::Receiver<PathUpdate>,
}

impl ScriptedPathSource {
    /// Returns the feeding half and the source. Dropping the sender
    /// exhausts the source.
    pub fn channel() -> (mpsc::Sender<PathUpdate>, Self) {
        let (tx, rx) = mpsc::channel(32);
        (tx, Self { rx })
    }
}

#[async_trait]
impl PathSource for ScriptedPathSource {
    async fn next_update(&mut self) -> Option<PathUpdate> {
        self.rx.recv().await
    }
}

/// Await `cond` becoming true, polling with short sleeps.
///
/// With `start_paused` tokio tests the sleeps auto-advance, making this
/// deterministic and effectively instant.
pub async fn wait_until<F: Fn() -> bool>(cond: F) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(60);
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not reached within deadline");
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
