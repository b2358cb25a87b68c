//! Frame-level checks applied before parsing.

use thiserror::Error;

/// Why an inbound frame was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Frame larger than the configured limit.
    #[error("Message exceeds maximum size of {limit} bytes")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
    /// Blank frame.
    #[error("Empty message")]
    Empty,
    /// Not a recognised event.
    #[error("Failed to parse message: {0}")]
    Invalid(String),
}

impl ProtocolError {
    /// Code sent in the `error` event.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "MESSAGE_TOO_LARGE",
            Self::Empty | Self::Invalid(_) => "INVALID_MESSAGE",
        }
    }
}

/// Validates raw frame size and content.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), ProtocolError> {
    if raw.len() > max_bytes {
        return Err(ProtocolError::TooLarge { limit: max_bytes });
    }

    if raw.trim().is_empty() {
        return Err(ProtocolError::Empty);
    }

    Ok(())
}
