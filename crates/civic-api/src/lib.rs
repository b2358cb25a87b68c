//! # civic-api
//!
//! HTTP surface of the notification service built on Axum.
//!
//! Provides the notification submission endpoint, the WebSocket upgrade
//! for delivery channels, the health endpoint, middleware (CORS, request
//! logging), the validating JSON extractor, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use state::AppState;
