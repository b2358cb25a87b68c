//! # civic-realtime
//!
//! Real-time notification delivery engine. Provides:
//!
//! - Connection handles and the user → channel registry
//! - The post-connect authentication handshake
//! - The in-memory pending tier (the durable tier lives in `civic-storage`)
//! - The delivery dispatcher: immediate push or dual-tier enqueue, and
//!   drain-on-authenticate
//! - The JSON event protocol spoken over the socket

pub mod connection;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

pub use connection::authenticator::{AuthFailure, HandshakeAuthenticator};
pub use connection::handle::ConnectionHandle;
pub use connection::manager::ConnectionManager;
pub use connection::registry::ConnectionRegistry;
pub use message::types::{InboundMessage, OutboundMessage};
pub use metrics::RealtimeMetrics;
pub use notification::dispatcher::{Delivery, DrainReport, NotificationDispatcher};
pub use notification::queue::MemoryPendingQueue;
pub use server::{EngineStats, RealtimeEngine};
