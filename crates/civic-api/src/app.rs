//! Application builder: wires collaborators, engine, router and server.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tracing::{error, info};

use civic_auth::identity::build_identity_provider;
use civic_core::config::{AppConfig, DirectoryProviderKind};
use civic_core::error::AppError;
use civic_core::traits::UserDirectory;
use civic_database::{DatabasePool, MemoryUserDirectory, UserRepository};
use civic_realtime::RealtimeEngine;
use civic_storage::FilePendingStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Constructs every collaborator and the delivery engine from configuration.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    // ── Step 1: Identity provider ────────────────────────────────
    let identity = build_identity_provider(&config.auth.identity)?;

    // ── Step 2: Local user store ─────────────────────────────────
    let (directory, database): (Arc<dyn UserDirectory>, Option<DatabasePool>) =
        match config.database.provider {
            DirectoryProviderKind::Postgres => {
                let pool = DatabasePool::connect_lazy(&config.database)?;
                let repo = UserRepository::new(pool.pool().clone());
                (Arc::new(repo), Some(pool))
            }
            DirectoryProviderKind::Memory => {
                info!(users = config.database.users.len(), "Using in-memory user directory");
                (
                    Arc::new(MemoryUserDirectory::from_map(&config.database.users)),
                    None,
                )
            }
        };

    // ── Step 3: Durable pending tier ─────────────────────────────
    let storage_dir = &config.realtime.notifications.storage_dir;
    let store = FilePendingStore::new(storage_dir).await?;
    info!(storage_dir = %storage_dir, "Durable notification store ready");

    // ── Step 4: Realtime engine ──────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        identity,
        directory,
        Arc::new(store),
    ));

    Ok(AppState {
        config: Arc::new(config),
        realtime,
        database,
        started_at: Instant::now(),
    })
}

/// Runs the notification server until Ctrl-C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting notification server...");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config).await?;
    let engine = Arc::clone(&state.realtime);
    let database = state.database.clone();

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(addr = %addr, "Notification server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            engine.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = database {
        pool.close().await;
    }

    info!("Notification server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
