// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, ordered, crash-safe storage for messages awaiting processing.
//!
//! [`PersistentQueue`] keeps a strict-FIFO list of [`QueuedMessage`]s backed
//! by a single JSON file. Every mutation rewrites the file atomically
//! (temp file + rename in the same directory), so a crash mid-write can
//! never leave a half-written store. A missing or unparseable file is
//! always treated as "nothing queued", never as fatal.

mod store;

pub use store::PersistentQueue;

/// File name of the durable store inside the queue directory.
pub const QUEUE_FILE: &str = "queue.json";
