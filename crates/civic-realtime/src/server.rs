//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

use civic_core::config::RealtimeConfig;
use civic_core::traits::{IdentityProvider, UserDirectory};
use civic_storage::PendingStore;

use crate::connection::authenticator::HandshakeAuthenticator;
use crate::connection::manager::ConnectionManager;
use crate::connection::registry::ConnectionRegistry;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::notification::dispatcher::NotificationDispatcher;
use crate::notification::queue::MemoryPendingQueue;

/// Central real-time engine that coordinates the delivery subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Socket lifecycle and event routing.
    pub connections: Arc<ConnectionManager>,
    /// User → channel registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Delivery dispatcher.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// In-memory pending tier.
    pub memory: Arc<MemoryPendingQueue>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

/// Live engine figures for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Open sockets.
    pub connections: usize,
    /// Users with a registered channel.
    pub authenticated_users: usize,
    /// Notifications pending in memory across all users.
    pub pending_in_memory: usize,
    /// Counters since start.
    pub counters: MetricsSnapshot,
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<dyn UserDirectory>,
        durable: Arc<dyn PendingStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let memory = Arc::new(MemoryPendingQueue::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&memory),
            durable,
            Arc::clone(&metrics),
            config.notifications.dedup_on_drain,
        ));
        let connections = Arc::new(ConnectionManager::new(
            config,
            Arc::clone(&registry),
            Arc::clone(&dispatcher),
            HandshakeAuthenticator::new(identity, directory),
            Arc::clone(&metrics),
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            registry,
            dispatcher,
            memory,
            metrics,
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Current engine figures.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            connections: self.connections.connection_count(),
            authenticated_users: self.connections.user_count(),
            pending_in_memory: self.memory.total(),
            counters: self.metrics.snapshot(),
        }
    }

    /// Signals socket tasks to stop and marks every connection closed.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
    }
}
