//! Session token claims.

use serde::{Deserialize, Serialize};

/// The subset of session-token claims the handshake needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the identity provider's user id.
    #[serde(default)]
    pub sub: Option<String>,
    /// Session id issued by the provider.
    #[serde(default)]
    pub sid: Option<String>,
}

impl TokenClaims {
    /// Non-empty subject, if present.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.trim().is_empty())
    }
}
