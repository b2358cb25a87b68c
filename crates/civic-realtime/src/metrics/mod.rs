//! Delivery engine counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Process-wide counters for connections and deliveries.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    authentications_succeeded: AtomicU64,
    authentications_failed: AtomicU64,
    messages_received: AtomicU64,
    notifications_pushed: AtomicU64,
    notifications_queued: AtomicU64,
    notifications_drained: AtomicU64,
    notifications_deduplicated: AtomicU64,
    push_failures: AtomicU64,
}

impl RealtimeMetrics {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A socket connected.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A socket went away.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Handshake outcome.
    pub fn authentication(&self, succeeded: bool) {
        if succeeded {
            self.authentications_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.authentications_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// An inbound frame arrived.
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification went straight to a live channel.
    pub fn notification_pushed(&self) {
        self.notifications_pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification was put in the pending tiers.
    pub fn notification_queued(&self) {
        self.notifications_queued.fetch_add(1, Ordering::Relaxed);
    }

    /// Notifications replayed during a drain.
    pub fn notifications_drained(&self, count: u64) {
        self.notifications_drained.fetch_add(count, Ordering::Relaxed);
    }

    /// Durable items skipped because the same pass already pushed them.
    pub fn notifications_deduplicated(&self, count: u64) {
        self.notifications_deduplicated
            .fetch_add(count, Ordering::Relaxed);
    }

    /// A channel refused a push.
    pub fn push_failed(&self) {
        self.push_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            authentications_succeeded: self.authentications_succeeded.load(Ordering::Relaxed),
            authentications_failed: self.authentications_failed.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            notifications_pushed: self.notifications_pushed.load(Ordering::Relaxed),
            notifications_queued: self.notifications_queued.load(Ordering::Relaxed),
            notifications_drained: self.notifications_drained.load(Ordering::Relaxed),
            notifications_deduplicated: self.notifications_deduplicated.load(Ordering::Relaxed),
            push_failures: self.push_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sockets ever connected.
    pub connections_total: u64,
    /// Sockets currently connected (authenticated or not).
    pub connections_active: u64,
    /// Successful handshakes.
    pub authentications_succeeded: u64,
    /// Failed handshakes.
    pub authentications_failed: u64,
    /// Inbound frames.
    pub messages_received: u64,
    /// Immediate pushes at submission time.
    pub notifications_pushed: u64,
    /// Submissions that went to the pending tiers.
    pub notifications_queued: u64,
    /// Notifications replayed on authenticate.
    pub notifications_drained: u64,
    /// Durable items skipped as already delivered in the same drain.
    pub notifications_deduplicated: u64,
    /// Pushes refused by a channel.
    pub push_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_connections_never_underflow() {
        let metrics = RealtimeMetrics::new();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.connection_closed();

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_total, 1);
        assert_eq!(snap.connections_active, 0);
    }
}
