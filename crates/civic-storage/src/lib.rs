//! # civic-storage
//!
//! Durable tier of the pending-notification queue: one append log per
//! user that survives process restarts.

pub mod pending;

pub use pending::file::FilePendingStore;
pub use pending::PendingStore;
