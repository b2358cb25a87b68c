//! Local user store lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::UserId;

/// Local user record resolved from an external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    /// Local user id; the key used by the registry and the pending queues.
    pub user_id: UserId,
    /// External identity this user is linked to.
    pub external_id: String,
}

/// Resolves external identities to local users.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Find the local user linked to `external_id`, if any.
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<LocalUser>>;
}
