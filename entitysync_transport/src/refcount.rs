//! Introspection-only reference counting for server-broadcast batches.
//!
//! When the server fans a single tick's worth of state out to several
//! clients, tests want to assert that every subscribed client eventually
//! drained its copy. The registry below is consulted nowhere in the
//! delivery path — dropping it entirely would not change what messages are
//! delivered or in what order.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub type BatchId = u64;

#[derive(Default)]
pub struct RefCountRegistry {
    next_id: AtomicU64,
    outstanding: Mutex<HashMap<BatchId, usize>>,
}

impl RefCountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new batch with `subscriber_count` recipients that have
    /// not yet received it.
    pub fn register(&self, subscriber_count: usize) -> BatchId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if subscriber_count > 0 {
            self.outstanding.lock().insert(id, subscriber_count);
        }
        id
    }

    /// One subscriber received the batch. The entry is deleted once the
    /// last subscriber has received it — it is never re-inserted at zero.
    pub fn mark_received(&self, id: BatchId) {
        let mut outstanding = self.outstanding.lock();
        if let Some(remaining) = outstanding.get_mut(&id) {
            if *remaining <= 1 {
                outstanding.remove(&id);
            } else {
                *remaining -= 1;
            }
        }
    }

    /// Number of subscribers that have not yet received this batch. Zero
    /// once every subscriber has received it (or once the batch id is
    /// unknown — the two are indistinguishable by design, matching the
    /// registry's introspection-only role).
    pub fn remaining(&self, id: BatchId) -> usize {
        self.outstanding.lock().get(&id).copied().unwrap_or(0)
    }
}
