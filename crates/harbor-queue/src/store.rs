// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persistent queue store: in-memory FIFO list + synchronous file writes.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, error, warn};

use harbor_core::{HarborError, QueuedMessage};

use crate::QUEUE_FILE;

/// Durable, bounded, ordered storage of deferred messages.
///
/// All operations are serialized through a single mutex covering both the
/// in-memory list mutation and the synchronous persistence write. This is
/// deliberately simple: the expected load is tens of messages. Callers must
/// not hold any await point while calling in -- every operation is sync and
/// returns quickly.
///
/// Index 0 is always the oldest surviving message. When a new message would
/// exceed capacity, the oldest is evicted first: stale unanswered messages
/// are less valuable than fresh ones.
pub struct PersistentQueue {
    path: PathBuf,
    capacity: usize,
    messages: Mutex<VecDeque<QueuedMessage>>,
}

impl PersistentQueue {
    /// Open (or create) a queue stored under `dir`.
    ///
    /// The directory is created if missing. A missing store file yields an
    /// empty queue; a file that fails to parse is logged and also yields an
    /// empty queue -- corruption is never fatal. A `capacity` of zero is
    /// clamped to one.
    pub fn open(dir: impl AsRef<Path>, capacity: usize) -> Result<Self, HarborError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| HarborError::Storage {
            source: Box::new(e),
        })?;
        let path = dir.join(QUEUE_FILE);
        let messages = Self::load(&path);
        debug!(
            path = %path.display(),
            loaded = messages.len(),
            "persistent queue opened"
        );
        Ok(Self {
            path,
            capacity: capacity.max(1),
            messages: Mutex::new(messages),
        })
    }

    /// Append a message to the tail, evicting the oldest first if the queue
    /// is at capacity. Persists before returning.
    pub fn enqueue(&self, message: QueuedMessage) {
        let mut messages = self.lock();
        if messages.len() >= self.capacity {
            // Counts only in the log, never message content.
            messages.pop_front();
            warn!(
                capacity = self.capacity,
                "queue at capacity, evicted oldest message"
            );
        }
        messages.push_back(message);
        self.persist(&messages);
    }

    /// Remove and return the oldest message, or `None` if empty.
    /// Persists before returning when a message was removed.
    pub fn dequeue(&self) -> Option<QueuedMessage> {
        let mut messages = self.lock();
        let front = messages.pop_front();
        if front.is_some() {
            self.persist(&messages);
        }
        front
    }

    /// Return a copy of the oldest message without removing it.
    pub fn peek(&self) -> Option<QueuedMessage> {
        self.lock().front().cloned()
    }

    /// Atomically remove and return the entire queue in FIFO order,
    /// leaving it empty. Persists the empty state.
    pub fn drain_all(&self) -> Vec<QueuedMessage> {
        let mut messages = self.lock();
        let drained: Vec<QueuedMessage> = messages.drain(..).collect();
        if !drained.is_empty() {
            self.persist(&messages);
        }
        drained
    }

    /// Discard all contents without returning them. Persists the empty state.
    pub fn clear(&self) {
        let mut messages = self.lock();
        if !messages.is_empty() {
            messages.clear();
            self.persist(&messages);
        }
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue holds no messages.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<QueuedMessage>> {
        // A poisoned mutex means another thread panicked mid-mutation; the
        // list itself is still structurally valid, so keep serving.
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load the store file, tolerating absence and corruption.
    fn load(path: &Path) -> VecDeque<QueuedMessage> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return VecDeque::new();
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to read queue file, starting empty");
                return VecDeque::new();
            }
        };
        match serde_json::from_slice::<Vec<QueuedMessage>>(&bytes) {
            Ok(list) => VecDeque::from(list),
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "queue file is corrupt, starting empty"
                );
                VecDeque::new()
            }
        }
    }

    /// Rewrite the store file atomically. Called with the list lock held.
    ///
    /// A write failure is logged, not propagated: the in-memory state stays
    /// correct for this process lifetime.
    fn persist(&self, messages: &VecDeque<QueuedMessage>) {
        let list: Vec<&QueuedMessage> = messages.iter().collect();
        let json = match serde_json::to_vec_pretty(&list) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize queue, skipping persist");
                return;
            }
        };
        // Temp file in the same directory so the rename cannot cross
        // filesystems and stays atomic.
        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, &json) {
            warn!(path = %tmp.display(), error = %e, "queue persist write failed");
            return;
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            warn!(path = %self.path.display(), error = %e, "queue persist rename failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::Address;
    use tempfile::tempdir;

    fn msg(text: &str) -> QueuedMessage {
        QueuedMessage::new(text, Address("+15551234567".into()))
    }

    #[test]
    fn drain_all_returns_insertion_order() {
        let dir = tempdir().unwrap();
        let queue = PersistentQueue::open(dir.path(), 50).unwrap();

        queue.enqueue(msg("A"));
        queue.enqueue(msg("B"));
        queue.enqueue(msg("C"));

        let drained = queue.drain_all();
        let texts: Vec<&str> = drained.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let dir = tempdir().unwrap();
        let queue = PersistentQueue::open(dir.path(), 50).unwrap();

        for i in 0..=50 {
            queue.enqueue(msg(&format!("m{i}")));
        }

        assert_eq!(queue.len(), 50);
        // m0 was evicted: the 51st enqueue pushed out the oldest.
        assert_eq!(queue.peek().unwrap().text, "m1");
    }

    #[test]
    fn small_capacity_eviction_shifts_survivors() {
        let dir = tempdir().unwrap();
        let queue = PersistentQueue::open(dir.path(), 3).unwrap();

        for text in ["a", "b", "c", "d", "e"] {
            queue.enqueue(msg(text));
        }

        let texts: Vec<String> = queue.drain_all().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["c", "d", "e"]);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let dir = tempdir().unwrap();
        let queue = PersistentQueue::open(dir.path(), 0).unwrap();

        queue.enqueue(msg("old"));
        queue.enqueue(msg("new"));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek().unwrap().text, "new");
    }

    #[test]
    fn persistence_round_trip() {
        let dir = tempdir().unwrap();
        let mut first = msg("first");
        first.retry_count = 2;
        let second = msg("second");

        {
            let queue = PersistentQueue::open(dir.path(), 50).unwrap();
            queue.enqueue(first.clone());
            queue.enqueue(second.clone());
        }

        // Fresh instance against the same storage location.
        let reopened = PersistentQueue::open(dir.path(), 50).unwrap();
        assert_eq!(reopened.len(), 2);
        let restored = reopened.dequeue().unwrap();
        assert_eq!(restored, first);
        assert_eq!(restored.retry_count, 2);
        assert_eq!(reopened.dequeue().unwrap(), second);
    }

    #[test]
    fn dequeue_persists_removal() {
        let dir = tempdir().unwrap();
        {
            let queue = PersistentQueue::open(dir.path(), 50).unwrap();
            queue.enqueue(msg("gone"));
            queue.enqueue(msg("kept"));
            let _ = queue.dequeue();
        }
        let reopened = PersistentQueue::open(dir.path(), 50).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.peek().unwrap().text, "kept");
    }

    #[test]
    fn corrupt_file_yields_empty_queue() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(QUEUE_FILE), b"{not json at all]]").unwrap();

        let queue = PersistentQueue::open(dir.path(), 50).unwrap();
        assert!(queue.is_empty());
        assert!(queue.dequeue().is_none());

        // The queue remains usable and re-persists cleanly.
        queue.enqueue(msg("fresh"));
        let reopened = PersistentQueue::open(dir.path(), 50).unwrap();
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn missing_file_yields_empty_queue() {
        let dir = tempdir().unwrap();
        let queue = PersistentQueue::open(dir.path(), 50).unwrap();
        assert!(queue.is_empty());
        assert!(queue.peek().is_none());
    }

    #[test]
    fn clear_discards_and_persists_empty() {
        let dir = tempdir().unwrap();
        {
            let queue = PersistentQueue::open(dir.path(), 50).unwrap();
            queue.enqueue(msg("x"));
            queue.enqueue(msg("y"));
            queue.clear();
            assert!(queue.is_empty());
        }
        let reopened = PersistentQueue::open(dir.path(), 50).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn peek_does_not_remove() {
        let dir = tempdir().unwrap();
        let queue = PersistentQueue::open(dir.path(), 50).unwrap();
        queue.enqueue(msg("only"));
        assert_eq!(queue.peek().unwrap().text, "only");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn drain_all_on_empty_returns_empty_vec() {
        let dir = tempdir().unwrap();
        let queue = PersistentQueue::open(dir.path(), 50).unwrap();
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn concurrent_enqueues_lose_nothing() {
        let dir = tempdir().unwrap();
        let queue = std::sync::Arc::new(PersistentQueue::open(dir.path(), 100).unwrap());

        let mut handles = Vec::new();
        for t in 0..4 {
            let q = std::sync::Arc::clone(&queue);
            handles.push(std::thread::spawn(move || {
                for i in 0..10 {
                    q.enqueue(msg(&format!("t{t}-{i}")));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 40);
        let reopened = PersistentQueue::open(dir.path(), 100).unwrap();
        assert_eq!(reopened.len(), 40);
    }
}
