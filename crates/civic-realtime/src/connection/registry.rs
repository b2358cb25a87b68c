//! Connection registry: the single authoritative user → channel mapping.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use civic_core::types::id::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// Thread-safe map of authenticated channels.
///
/// At most one channel is registered per user; registering again for the
/// same user supersedes the previous channel without closing it.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// User ID → the user's current channel.
    by_user: DashMap<UserId, Arc<ConnectionHandle>>,
    /// Connection ID → user it is bound to.
    by_id: DashMap<ConnectionId, UserId>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handle` to `user_id`, replacing any existing binding for that
    /// user. If this channel was bound to another user, that binding is
    /// dropped.
    pub fn register(&self, user_id: UserId, handle: Arc<ConnectionHandle>) {
        let conn_id = handle.id;

        if let Some(previous_user) = self.by_id.insert(conn_id, user_id.clone()) {
            if previous_user != user_id {
                self.by_user
                    .remove_if(&previous_user, |_, current| current.id == conn_id);
            }
        }

        if let Some(superseded) = self.by_user.insert(user_id.clone(), handle) {
            if superseded.id != conn_id {
                self.by_id
                    .remove_if(&superseded.id, |_, bound| *bound == user_id);
                debug!(
                    user_id = %user_id,
                    conn_id = %conn_id,
                    superseded = %superseded.id,
                    "Superseded previous channel"
                );
            }
        }
    }

    /// Removes the binding for `conn_id`, but only evicts the user's entry
    /// if it still points at this channel. Returns the user that was bound.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<UserId> {
        let (_, user_id) = self.by_id.remove(conn_id)?;
        self.by_user
            .remove_if(&user_id, |_, current| current.id == *conn_id);
        Some(user_id)
    }

    /// The user's registered channel, if any (regardless of liveness).
    pub fn lookup(&self, user_id: &UserId) -> Option<Arc<ConnectionHandle>> {
        self.by_user.get(user_id).map(|entry| entry.value().clone())
    }

    /// The user's registered channel if it can still accept events.
    pub fn lookup_live(&self, user_id: &UserId) -> Option<Arc<ConnectionHandle>> {
        self.lookup(user_id).filter(|handle| handle.is_alive())
    }

    /// The user a connection is bound to.
    pub fn user_for(&self, conn_id: &ConnectionId) -> Option<UserId> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Whether the user has a registered channel.
    pub fn is_registered(&self, user_id: &UserId) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Number of users with a registered channel.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Removes every binding.
    pub fn clear(&self) {
        self.by_user.clear();
        self.by_id.clear();
    }
}
