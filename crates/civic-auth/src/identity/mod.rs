//! Identity provider implementations.

pub mod clerk;
pub mod memory;

use std::sync::Arc;

use civic_core::config::{IdentityConfig, IdentityProviderKind};
use civic_core::result::AppResult;
use civic_core::traits::identity::IdentityProvider;

pub use clerk::ClerkIdentityProvider;
pub use memory::MemoryIdentityProvider;

/// Build the configured identity provider.
pub fn build_identity_provider(config: &IdentityConfig) -> AppResult<Arc<dyn IdentityProvider>> {
    let provider: Arc<dyn IdentityProvider> = match config.provider {
        IdentityProviderKind::Clerk => Arc::new(ClerkIdentityProvider::new(config)?),
        IdentityProviderKind::Memory => Arc::new(MemoryIdentityProvider::from_subjects(
            &config.known_subjects,
        )),
    };
    tracing::info!(provider = provider.provider_name(), "Identity provider ready");
    Ok(provider)
}
