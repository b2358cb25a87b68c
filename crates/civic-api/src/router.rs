//! Route definitions for the notification HTTP API.
//!
//! REST routes are mounted under `/api`; the delivery socket lives at `/ws`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_handler));

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Live notification submission
fn notification_routes() -> Router<AppState> {
    Router::new().route(
        "/v2/live-notifications/submit-notification",
        post(handlers::notification::submit_notification),
    )
}

/// Health and delivery stats
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
