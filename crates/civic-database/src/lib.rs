//! # civic-database
//!
//! PostgreSQL connection pool and the local user lookups the handshake
//! depends on. Only the read path needed for authentication lives here;
//! the rest of the relational schema is owned by other services.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::user::{MemoryUserDirectory, UserRepository};
