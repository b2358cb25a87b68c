//! Post-connect authentication handshake.
//!
//! Pipeline: strip the bearer prefix and decode the subject claim, then
//! confirm the subject with the identity provider, then resolve it to a
//! local user. Every step must pass; no step has registry side effects.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use civic_auth::token::{TokenDecoder, TokenError};
use civic_core::traits::{IdentityProvider, LocalUser, UserDirectory};

/// Why a handshake was rejected. `Display` is the client-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No credential was supplied.
    #[error("No token provided")]
    MissingToken,
    /// The credential decoded but names no subject.
    #[error("Invalid token format")]
    InvalidFormat,
    /// The credential could not be decoded, or has expired.
    #[error("Invalid token")]
    InvalidToken,
    /// The identity provider does not know the subject.
    #[error("User not found in identity provider")]
    UnknownIdentity,
    /// No local user is linked to the subject.
    #[error("User not found in database")]
    UnknownLocalUser,
    /// A collaborator failed unexpectedly.
    #[error("Authentication failed")]
    Unexpected,
}

impl From<TokenError> for AuthFailure {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => Self::MissingToken,
            TokenError::MissingSubject => Self::InvalidFormat,
            TokenError::Malformed(_) => Self::InvalidToken,
        }
    }
}

/// Validates channel credentials against the identity provider and the
/// local user directory.
#[derive(Debug, Clone)]
pub struct HandshakeAuthenticator {
    decoder: TokenDecoder,
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn UserDirectory>,
}

impl HandshakeAuthenticator {
    /// Creates an authenticator over the given collaborators.
    pub fn new(identity: Arc<dyn IdentityProvider>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            decoder: TokenDecoder::new(),
            identity,
            directory,
        }
    }

    /// Resolves a credential to a local user.
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<LocalUser, AuthFailure> {
        let raw = credential.ok_or(AuthFailure::MissingToken)?;

        let (subject, _claims) = self.decoder.decode(raw).map_err(|e| {
            debug!(error = %e, "Credential rejected during decode");
            AuthFailure::from(e)
        })?;

        match self.identity.find_user(&subject).await {
            Ok(Some(_profile)) => {}
            Ok(None) => return Err(AuthFailure::UnknownIdentity),
            Err(e) => {
                warn!(
                    provider = self.identity.provider_name(),
                    subject = %subject,
                    error = %e,
                    "Identity provider lookup failed"
                );
                return Err(AuthFailure::Unexpected);
            }
        }

        match self.directory.find_by_external_id(&subject).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AuthFailure::UnknownLocalUser),
            Err(e) => {
                warn!(subject = %subject, error = %e, "Local user lookup failed");
                Err(AuthFailure::Unexpected)
            }
        }
    }
}
