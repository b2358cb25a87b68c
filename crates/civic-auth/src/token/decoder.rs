//! Structural decoding of session tokens.
//!
//! The decoder only reads the claims segment to learn which subject the
//! client claims to be. It is never the trust decision: the handshake
//! always confirms the subject with the identity provider.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use thiserror::Error;

use super::claims::TokenClaims;

/// Prefix accepted (and stripped) in front of the raw token.
const BEARER_PREFIX: &str = "Bearer ";

/// Why a credential could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// No credential, or only whitespace / a bare prefix.
    #[error("no token provided")]
    Missing,
    /// The token does not have a decodable claims segment.
    #[error("malformed token: {0}")]
    Malformed(String),
    /// The claims decoded but carry no subject.
    #[error("token has no subject claim")]
    MissingSubject,
}

/// Decodes the claims segment of a compact three-part token.
#[derive(Debug, Clone, Default)]
pub struct TokenDecoder;

impl TokenDecoder {
    /// Creates a new decoder.
    pub fn new() -> Self {
        Self
    }

    /// Strips an optional `Bearer ` prefix and surrounding whitespace.
    pub fn strip_bearer(raw: &str) -> &str {
        let trimmed = raw.trim();
        trimmed.strip_prefix(BEARER_PREFIX).unwrap_or(trimmed).trim()
    }

    /// Decodes the claims and returns them along with the subject.
    pub fn decode(&self, raw: &str) -> Result<(String, TokenClaims), TokenError> {
        let token = Self::strip_bearer(raw);
        if token.is_empty() || token == BEARER_PREFIX.trim() {
            return Err(TokenError::Missing);
        }

        let payload = token
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| TokenError::Malformed("missing claims segment".to_string()))?;

        let bytes = decode_segment(payload)?;
        let claims: TokenClaims = serde_json::from_slice(&bytes)
            .map_err(|e| TokenError::Malformed(format!("claims are not JSON: {e}")))?;

        let subject = claims
            .subject()
            .ok_or(TokenError::MissingSubject)?
            .to_string();

        Ok((subject, claims))
    }
}

/// Base64 decode accepting both URL-safe and standard alphabets, padded or not.
fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    let unpadded = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(unpadded)
        .or_else(|_| STANDARD_NO_PAD.decode(unpadded))
        .map_err(|e| TokenError::Malformed(format!("claims are not base64: {e}")))
}
