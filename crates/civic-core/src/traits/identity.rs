//! Identity provider lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Minimal profile returned by the identity provider for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Provider-side subject identifier (the credential's `sub` claim).
    pub id: String,
    /// Primary email address, when the provider exposes one.
    #[serde(default)]
    pub email: Option<String>,
}

/// Authoritative lookup of an external identity by id.
///
/// Implementations return `Ok(None)` when the provider reports the subject
/// does not exist; transport or provider failures are `Err`.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Short provider name for logging.
    fn provider_name(&self) -> &str;

    /// Look up a subject by its provider-side id.
    async fn find_user(&self, subject: &str) -> AppResult<Option<IdentityProfile>>;
}
