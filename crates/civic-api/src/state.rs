//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use civic_core::config::AppConfig;
use civic_database::DatabasePool;
use civic_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Real-time delivery engine
    pub realtime: Arc<RealtimeEngine>,
    /// PostgreSQL pool, when the local user store is the database
    pub database: Option<DatabasePool>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}
