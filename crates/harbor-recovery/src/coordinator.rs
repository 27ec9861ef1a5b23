// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recovery coordinator: glues the connectivity monitor, the persistent
//! queue, and the injected processing pipeline together.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use harbor_config::model::RecoveryConfig;
use harbor_core::{
    Address, AgentStatus, Connectivity, HarborError, MessageProcessor, Notifier, QueuedMessage,
    StatusSink,
};
use harbor_queue::PersistentQueue;

/// Notice sent once per offline episode to affected conversations.
pub const OFFLINE_NOTICE: &str =
    "I'm temporarily offline. Your messages are saved and I'll catch up soon.";

/// Notice sent to owner addresses when connectivity returns.
pub const ONLINE_NOTICE: &str = "I'm back online! Let me catch up on what I missed.";

/// Per-episode session state. In-memory only: after a crash a fresh offline
/// episode begins and notices go out again.
struct Session {
    /// Guards against concurrent drains.
    draining: bool,
    /// Addresses already told "we are offline" in the current episode.
    notified: HashSet<Address>,
}

/// Turns connectivity signals and queue contents into user-visible behavior.
///
/// The coordinator owns no transport and no pipeline of its own: processing
/// goes through the injected [`MessageProcessor`], notices through the
/// [`Notifier`], and status transitions through the [`StatusSink`]. It
/// reacts to connectivity changes on a background listener task and runs
/// each catch-up drain as an independent task, so neither ever blocks
/// change delivery.
pub struct RecoveryCoordinator {
    queue: Arc<PersistentQueue>,
    connectivity: Arc<dyn Connectivity>,
    notifier: Arc<dyn Notifier>,
    status: Arc<dyn StatusSink>,
    config: RecoveryConfig,
    /// Conversation addresses that receive offline/online notices.
    owners: StdMutex<Vec<Address>>,
    /// The hook into the real pipeline. Absence at drain time is a
    /// configuration error: messages stay queued.
    processor: StdMutex<Option<Arc<dyn MessageProcessor>>>,
    session: StdMutex<Session>,
    cancel: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
    /// Self-reference for spawning the listener and drain tasks.
    weak: std::sync::Weak<RecoveryCoordinator>,
}

impl RecoveryCoordinator {
    /// Create a coordinator over the given collaborators.
    ///
    /// Owner addresses are seeded from `config.owner_addresses`; the
    /// processor is injected separately via [`set_processor`](Self::set_processor).
    pub fn new(
        queue: Arc<PersistentQueue>,
        connectivity: Arc<dyn Connectivity>,
        notifier: Arc<dyn Notifier>,
        status: Arc<dyn StatusSink>,
        config: RecoveryConfig,
    ) -> Arc<Self> {
        let owners = config
            .owner_addresses
            .iter()
            .map(|a| Address(a.clone()))
            .collect();
        Arc::new_cyclic(|weak| Self {
            queue,
            connectivity,
            notifier,
            status,
            config,
            owners: StdMutex::new(owners),
            processor: StdMutex::new(None),
            session: StdMutex::new(Session {
                draining: false,
                notified: HashSet::new(),
            }),
            cancel: CancellationToken::new(),
            listener: Mutex::new(None),
            weak: weak.clone(),
        })
    }

    /// Replace the set of addresses that receive offline/online notices.
    pub fn configure_owners(&self, addresses: Vec<Address>) {
        *self.lock_owners() = addresses;
    }

    /// Inject the message-processing callback.
    pub fn set_processor(&self, processor: Arc<dyn MessageProcessor>) {
        *self
            .processor
            .lock()
            .unwrap_or_else(|p| p.into_inner()) = Some(processor);
    }

    /// Subscribe to the connectivity monitor and begin coordinating.
    ///
    /// Idempotent. If the queue already holds persisted content (e.g. after
    /// a crash) and connectivity is currently up, a drain is triggered
    /// immediately. A coordinator cannot be restarted once stopped;
    /// construct a new instance instead.
    pub async fn start(&self) -> Result<(), HarborError> {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            warn!("coordinator already stopped, construct a new instance to restart");
            return Ok(());
        }
        let Some(this) = self.weak.upgrade() else {
            return Ok(());
        };

        let mut rx = self.connectivity.subscribe();
        let cancel = self.cancel.clone();
        *listener = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            debug!("connectivity channel closed, listener exiting");
                            break;
                        }
                        let state = *rx.borrow_and_update();
                        if state.connected {
                            this.handle_restored().await;
                        } else {
                            this.handle_lost().await;
                        }
                    }
                }
            }
        }));
        drop(listener);

        if !self.queue.is_empty() && self.connectivity.is_connected() {
            info!(
                queued = self.queue.len(),
                "persisted backlog found at start, draining"
            );
            self.spawn_drain();
        }
        Ok(())
    }

    /// Unsubscribe from the connectivity monitor. Idempotent, and final:
    /// a later `start` is a logged no-op.
    pub async fn stop(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.listener.lock().await.take() {
            let _ = handle.await;
        }
    }

    /// Whether the last observed connectivity state is disconnected.
    ///
    /// Callers use this to decide between immediate processing and
    /// [`queue_message`](Self::queue_message).
    pub fn is_offline(&self) -> bool {
        !self.connectivity.is_connected()
    }

    /// Number of messages currently deferred.
    pub fn queued_message_count(&self) -> usize {
        self.queue.len()
    }

    /// Defer a message that cannot be processed right now (offline, or a
    /// processing attempt failed with a network-classified error).
    ///
    /// Enqueues the message, makes sure the sender has been told about the
    /// outage once this episode, and marks the agent degraded.
    pub async fn queue_message(&self, text: &str, sender: &Address) {
        self.queue.enqueue(QueuedMessage::new(text, sender.clone()));
        debug!(queued = self.queue.len(), "message deferred to queue");
        self.notify_offline_once(sender).await;
        self.status.update_status(AgentStatus::Degraded);
    }

    /// Connectivity lost: surface the outage.
    async fn handle_lost(&self) {
        info!("connectivity lost");
        self.status.update_status(AgentStatus::Offline);
        let owners = self.lock_owners().clone();
        for addr in owners {
            self.notify_offline_once(&addr).await;
        }
    }

    /// Connectivity restored: a new episode begins, owners hear about it,
    /// and the backlog is drained on an independent task.
    async fn handle_restored(&self) {
        info!(queued = self.queue.len(), "connectivity restored");
        self.lock_session().notified.clear();
        let status = if self.queue.is_empty() {
            AgentStatus::Healthy
        } else {
            AgentStatus::Degraded
        };
        self.status.update_status(status);

        let Some(this) = self.weak.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            let owners = this.lock_owners().clone();
            for addr in owners {
                if let Err(e) = this.notifier.send(ONLINE_NOTICE, &addr).await {
                    warn!(error = %e, "online notice delivery failed");
                }
            }
            this.drain().await;
        });
    }

    /// Send the offline notice to `addr` unless it was already told during
    /// this offline episode.
    async fn notify_offline_once(&self, addr: &Address) {
        let first_time = self.lock_session().notified.insert(addr.clone());
        if !first_time {
            return;
        }
        if let Err(e) = self.notifier.send(OFFLINE_NOTICE, addr).await {
            // Logged and swallowed: a notice failure must never block
            // queuing or draining.
            warn!(error = %e, "offline notice delivery failed");
        }
    }

    fn spawn_drain(&self) {
        let Some(this) = self.weak.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            this.drain().await;
        });
    }

    /// Drain the queue through the processor, pacing between messages.
    ///
    /// At most one drain runs at a time; a second call returns immediately.
    /// A disconnect observed mid-drain re-queues the current and all
    /// remaining messages in their original order and exits. A failed
    /// message is re-queued at the *tail*, behind already-restored and
    /// newly arrived messages, until its retry count reaches the ceiling,
    /// after which it is dropped.
    pub async fn drain(&self) {
        {
            let mut session = self.lock_session();
            if session.draining {
                debug!("drain already in progress, skipping");
                return;
            }
            session.draining = true;
        }
        self.drain_inner().await;
        self.lock_session().draining = false;
    }

    async fn drain_inner(&self) {
        let processor = self
            .processor
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        let Some(processor) = processor else {
            error!("no message processor configured, messages remain queued");
            return;
        };

        let mut pending: VecDeque<QueuedMessage> = self.queue.drain_all().into();
        if pending.is_empty() {
            return;
        }
        let total = pending.len();
        info!(total, "catch-up drain started");

        let mut processed = 0usize;
        while let Some(mut msg) = pending.pop_front() {
            // Cooperative cancellation: checked once per message.
            if !self.connectivity.is_connected() {
                let requeued = 1 + pending.len();
                self.queue.enqueue(msg);
                for rest in pending {
                    self.queue.enqueue(rest);
                }
                warn!(requeued, processed, "connectivity lost mid-drain, remainder re-queued");
                return;
            }

            let succeeded = match processor.process(&msg.text, &msg.sender).await {
                Ok(succeeded) => succeeded,
                Err(e) => {
                    warn!(error = %e, "processor returned an error");
                    false
                }
            };

            if succeeded {
                processed += 1;
            } else {
                msg.retry_count += 1;
                if msg.retry_count < self.config.max_retries {
                    debug!(retry_count = msg.retry_count, "processing failed, re-queued at tail");
                    self.queue.enqueue(msg);
                } else {
                    warn!(
                        retry_count = msg.retry_count,
                        "retry ceiling reached, dropping message"
                    );
                }
            }

            // Pace the recovered backend; no pause after the last message.
            if !pending.is_empty() {
                tokio::time::sleep(Duration::from_millis(self.config.drain_delay_ms)).await;
            }
        }

        info!(processed, total, "catch-up drain finished");
        if self.queue.is_empty() {
            self.status.update_status(AgentStatus::Healthy);
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_owners(&self) -> std::sync::MutexGuard<'_, Vec<Address>> {
        self.owners.lock().unwrap_or_else(|p| p.into_inner())
    }
}
