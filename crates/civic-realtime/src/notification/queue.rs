//! In-memory pending tier.
//!
//! Volatile per-user FIFO mirroring undelivered notifications for the
//! lifetime of the process. Drains take the whole list at once.

use std::collections::VecDeque;

use dashmap::DashMap;

use civic_core::types::id::UserId;
use civic_entity::Notification;

/// Per-user FIFO of pending notifications held in process memory.
#[derive(Debug, Default)]
pub struct MemoryPendingQueue {
    queues: DashMap<UserId, VecDeque<Notification>>,
}

impl MemoryPendingQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification to the user's queue.
    pub fn enqueue(&self, user_id: &UserId, notification: Notification) {
        self.queues
            .entry(user_id.clone())
            .or_default()
            .push_back(notification);
    }

    /// Returns the user's queue in order and clears it atomically.
    pub fn drain_all(&self, user_id: &UserId) -> Vec<Notification> {
        self.queues
            .remove(user_id)
            .map(|(_, queue)| queue.into())
            .unwrap_or_default()
    }

    /// Puts `items` back at the head of the user's queue, keeping their
    /// order and placing them ahead of anything enqueued since.
    pub fn requeue_front(&self, user_id: &UserId, items: Vec<Notification>) {
        if items.is_empty() {
            return;
        }
        let mut queue = self.queues.entry(user_id.clone()).or_default();
        for item in items.into_iter().rev() {
            queue.push_front(item);
        }
    }

    /// Whether the user has nothing pending in memory.
    pub fn is_empty(&self, user_id: &UserId) -> bool {
        self.queues
            .get(user_id)
            .is_none_or(|queue| queue.is_empty())
    }

    /// Number of notifications pending in memory for the user.
    pub fn len(&self, user_id: &UserId) -> usize {
        self.queues.get(user_id).map_or(0, |queue| queue.len())
    }

    /// Total notifications pending in memory across all users.
    pub fn total(&self) -> usize {
        self.queues.iter().map(|entry| entry.value().len()).sum()
    }
}
