//! Connection manager: socket lifecycle and inbound event routing.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use civic_core::config::RealtimeConfig;
use civic_core::types::id::{ConnectionId, UserId};

use crate::message::serializer::deserialize_inbound;
use crate::message::types::{AuthenticatePayload, InboundMessage, OutboundMessage};
use crate::message::validator::{ProtocolError, validate_inbound};
use crate::metrics::RealtimeMetrics;
use crate::notification::dispatcher::NotificationDispatcher;

use super::authenticator::HandshakeAuthenticator;
use super::handle::ConnectionHandle;
use super::registry::ConnectionRegistry;

/// Owns every open socket, authenticated or not, and routes their events.
#[derive(Debug)]
pub struct ConnectionManager {
    /// All open connections, from transport connect to disconnect.
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    registry: Arc<ConnectionRegistry>,
    dispatcher: Arc<NotificationDispatcher>,
    authenticator: HandshakeAuthenticator,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<ConnectionRegistry>,
        dispatcher: Arc<NotificationDispatcher>,
        authenticator: HandshakeAuthenticator,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            connections: DashMap::new(),
            registry,
            dispatcher,
            authenticator,
            metrics,
            config,
        }
    }

    /// Tracks a freshly connected, not yet authenticated socket.
    ///
    /// Returns the handle and the receiver the socket writer drains.
    pub fn open(&self) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (handle, rx) = ConnectionHandle::channel(self.config.outbound_buffer_size);
        let handle = Arc::new(handle);

        self.connections.insert(handle.id, Arc::clone(&handle));
        self.metrics.connection_opened();
        debug!(conn_id = %handle.id, "Socket connected");

        (handle, rx)
    }

    /// Processes one inbound text frame.
    pub async fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(handle) = self.connections.get(conn_id).map(|e| e.value().clone()) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        self.metrics.message_received();

        let parsed = validate_inbound(raw, self.config.max_message_bytes).and_then(|()| {
            deserialize_inbound(raw).map_err(|e| ProtocolError::Invalid(e.to_string()))
        });

        let msg = match parsed {
            Ok(msg) => msg,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "Rejected inbound frame");
                handle
                    .send(OutboundMessage::error(e.code(), e.to_string()))
                    .await;
                return;
            }
        };

        match msg {
            InboundMessage::Authenticate(payload) => self.handle_authenticate(&handle, payload).await,
        }
    }

    /// Runs the handshake and, on success, binds and drains.
    async fn handle_authenticate(&self, handle: &Arc<ConnectionHandle>, payload: AuthenticatePayload) {
        let user = match self.authenticator.authenticate(payload.token.as_deref()).await {
            Ok(user) => user,
            Err(failure) => {
                self.metrics.authentication(false);
                info!(conn_id = %handle.id, reason = %failure, "Authentication failed");
                handle
                    .send(OutboundMessage::authentication_error(failure.to_string()))
                    .await;
                return;
            }
        };

        self.metrics.authentication(true);
        info!(
            conn_id = %handle.id,
            user_id = %user.user_id,
            "User authenticated and connected"
        );

        if let Err(e) = self.dispatcher.attach(&user.user_id, handle).await {
            error!(
                conn_id = %handle.id,
                user_id = %user.user_id,
                error = %e,
                "Pending notification drain aborted"
            );
        }
    }

    /// Handles a transport-level disconnect.
    pub fn close(&self, conn_id: &ConnectionId) {
        if let Some((_, handle)) = self.connections.remove(conn_id) {
            handle.mark_closed();
            self.metrics.connection_closed();
        }

        if let Some(user_id) = self.registry.unregister(conn_id) {
            info!(conn_id = %conn_id, user_id = %user_id, "User disconnected");
        } else {
            debug!(conn_id = %conn_id, "Unauthenticated socket disconnected");
        }
    }

    /// Marks every connection closed and empties the registry.
    pub fn close_all(&self) {
        let count = self.connections.len();
        for entry in self.connections.iter() {
            entry.value().mark_closed();
        }
        self.connections.clear();
        self.registry.clear();
        info!(count, "All connections closed");
    }

    /// User the connection is currently bound to.
    pub fn bound_user(&self, conn_id: &ConnectionId) -> Option<UserId> {
        self.registry.user_for(conn_id)
    }

    /// Number of open sockets.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of users with a registered channel.
    pub fn user_count(&self) -> usize {
        self.registry.user_count()
    }
}
