//! Delivery dispatcher: immediate push vs. dual-tier enqueue, and the
//! drain that replays pending notifications on authentication.
//!
//! Submission and register-then-drain for the same user run under one
//! per-user lock, so a notification is either pushed to the channel being
//! registered or picked up by its drain, never stranded between the two.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use civic_core::result::AppResult;
use civic_core::sync::KeyedLock;
use civic_core::types::id::{NotificationId, UserId};
use civic_entity::Notification;
use civic_storage::PendingStore;

use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

use super::queue::MemoryPendingQueue;

/// Outcome of a submission. Internal only; never reported to the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Pushed to the user's live channel.
    Pushed,
    /// Held in both pending tiers.
    Queued,
}

/// What a drain pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Items pushed from the in-memory tier.
    pub from_memory: usize,
    /// Items pushed from the durable tier.
    pub from_durable: usize,
    /// Durable items skipped because this pass already pushed them.
    pub deduplicated: usize,
    /// Items put back because the channel closed mid-pass.
    pub restored: usize,
}

impl DrainReport {
    /// Total notifications pushed in this pass.
    pub fn delivered(&self) -> usize {
        self.from_memory + self.from_durable
    }
}

/// Routes notifications to live channels or the pending tiers.
#[derive(Debug)]
pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
    memory: Arc<MemoryPendingQueue>,
    durable: Arc<dyn PendingStore>,
    metrics: Arc<RealtimeMetrics>,
    /// Serializes submit and register+drain per user.
    locks: KeyedLock<UserId>,
    dedup_on_drain: bool,
}

impl NotificationDispatcher {
    /// Create a new dispatcher
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        memory: Arc<MemoryPendingQueue>,
        durable: Arc<dyn PendingStore>,
        metrics: Arc<RealtimeMetrics>,
        dedup_on_drain: bool,
    ) -> Self {
        Self {
            registry,
            memory,
            durable,
            metrics,
            locks: KeyedLock::new(),
            dedup_on_drain,
        }
    }

    /// Deliver `notification` to its target user.
    ///
    /// Pushes immediately when the user has a live channel, waiting for room
    /// in its outbound buffer. Otherwise appends to the in-memory tier and
    /// then the durable tier; a durable failure is returned after the
    /// in-memory append.
    pub async fn submit(&self, notification: Notification) -> AppResult<Delivery> {
        let user_id = notification.recipient();
        let _guard = self.locks.lock(&user_id).await;

        if let Some(handle) = self.registry.lookup_live(&user_id) {
            if handle
                .send(OutboundMessage::Notification(notification.clone()))
                .await
            {
                self.metrics.notification_pushed();
                debug!(
                    user_id = %user_id,
                    conn_id = %handle.id,
                    notification_id = %notification.id,
                    "Pushed notification to live channel"
                );
                return Ok(Delivery::Pushed);
            }
            self.metrics.push_failed();
            warn!(
                user_id = %user_id,
                conn_id = %handle.id,
                notification_id = %notification.id,
                "Live channel closed, queueing instead"
            );
        }

        self.memory.enqueue(&user_id, notification.clone());
        if let Err(e) = self.durable.append(&user_id, &notification).await {
            error!(
                user_id = %user_id,
                notification_id = %notification.id,
                error = %e,
                "Failed to persist pending notification"
            );
            return Err(e);
        }

        self.metrics.notification_queued();
        debug!(
            user_id = %user_id,
            notification_id = %notification.id,
            "Queued notification for offline user"
        );
        Ok(Delivery::Queued)
    }

    /// Bind `handle` to `user_id`, acknowledge the handshake on the channel,
    /// then replay everything pending for the user.
    ///
    /// The acknowledgement is sent before any replayed notification.
    pub async fn attach(
        &self,
        user_id: &UserId,
        handle: &Arc<ConnectionHandle>,
    ) -> AppResult<DrainReport> {
        let _guard = self.locks.lock(user_id).await;

        self.registry.register(user_id.clone(), Arc::clone(handle));
        handle
            .send(OutboundMessage::authenticated(user_id.clone()))
            .await;

        self.drain_locked(user_id, handle).await
    }

    /// Replay pending notifications for `user_id` to `handle`.
    pub async fn drain(
        &self,
        user_id: &UserId,
        handle: &ConnectionHandle,
    ) -> AppResult<DrainReport> {
        let _guard = self.locks.lock(user_id).await;
        self.drain_locked(user_id, handle).await
    }

    /// Drain protocol: in-memory tier first, then the durable tier, each in
    /// FIFO order. Pushes wait for buffer space; if the channel closes the
    /// unpushed remainder of that tier is put back and the pass stops.
    async fn drain_locked(
        &self,
        user_id: &UserId,
        handle: &ConnectionHandle,
    ) -> AppResult<DrainReport> {
        let mut report = DrainReport::default();
        let mut delivered: HashSet<NotificationId> = HashSet::new();

        let in_memory = self.memory.drain_all(user_id);
        let mut items = in_memory.into_iter();
        while let Some(notification) = items.next() {
            let id = notification.id.clone();
            if !handle
                .send(OutboundMessage::Notification(notification.clone()))
                .await
            {
                let mut remainder = vec![notification];
                remainder.extend(items);
                report.restored = remainder.len();
                self.memory.requeue_front(user_id, remainder);
                self.finish_interrupted(user_id, handle, &report);
                return Ok(report);
            }
            delivered.insert(id);
            report.from_memory += 1;
        }

        let durable = match self.durable.drain_all(user_id).await {
            Ok(items) => items,
            Err(e) => {
                error!(
                    user_id = %user_id,
                    error = %e,
                    "Failed to drain durable tier, leaving it for the next authentication"
                );
                self.record(&report);
                return Err(e);
            }
        };

        let mut items = durable.into_iter();
        while let Some(notification) = items.next() {
            if self.dedup_on_drain && delivered.contains(&notification.id) {
                report.deduplicated += 1;
                continue;
            }

            if !handle
                .send(OutboundMessage::Notification(notification.clone()))
                .await
            {
                let remainder: Vec<Notification> = std::iter::once(notification)
                    .chain(items)
                    .filter(|n| !(self.dedup_on_drain && delivered.contains(&n.id)))
                    .collect();
                report.restored = remainder.len();
                if let Err(e) = self.durable.restore(user_id, remainder).await {
                    error!(
                        user_id = %user_id,
                        error = %e,
                        "Failed to restore undelivered durable notifications"
                    );
                    self.record(&report);
                    return Err(e);
                }
                self.finish_interrupted(user_id, handle, &report);
                return Ok(report);
            }
            report.from_durable += 1;
        }

        self.record(&report);
        if report.delivered() > 0 || report.deduplicated > 0 {
            info!(
                user_id = %user_id,
                conn_id = %handle.id,
                from_memory = report.from_memory,
                from_durable = report.from_durable,
                deduplicated = report.deduplicated,
                "Delivered pending notifications"
            );
        }
        Ok(report)
    }

    fn finish_interrupted(&self, user_id: &UserId, handle: &ConnectionHandle, report: &DrainReport) {
        self.metrics.push_failed();
        self.record(report);
        warn!(
            user_id = %user_id,
            conn_id = %handle.id,
            delivered = report.delivered(),
            restored = report.restored,
            "Channel closed mid-drain; remainder kept pending"
        );
    }

    fn record(&self, report: &DrainReport) {
        self.metrics.notifications_drained(report.delivered() as u64);
        self.metrics
            .notifications_deduplicated(report.deduplicated as u64);
    }
}
