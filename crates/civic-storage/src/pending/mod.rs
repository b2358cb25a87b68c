//! Durable pending-notification store abstraction.

pub mod file;

use async_trait::async_trait;

use civic_core::result::AppResult;
use civic_core::types::id::UserId;
use civic_entity::Notification;

/// Per-user ordered record of notifications awaiting delivery.
///
/// A missing record is equivalent to an empty one. Every operation on a
/// single user's record is atomic with respect to other operations on the
/// same record.
#[async_trait]
pub trait PendingStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append one notification to the end of the user's record.
    async fn append(&self, user_id: &UserId, notification: &Notification) -> AppResult<()>;

    /// Read the full record and clear it, returning what was read in order.
    ///
    /// The record is only cleared if it was read successfully.
    async fn drain_all(&self, user_id: &UserId) -> AppResult<Vec<Notification>>;

    /// Put `items` back at the head of the record, ahead of anything
    /// appended since they were drained.
    async fn restore(&self, user_id: &UserId, items: Vec<Notification>) -> AppResult<()>;

    /// Read the record without clearing it.
    async fn peek(&self, user_id: &UserId) -> AppResult<Vec<Notification>>;
}
