//! Inbound and outbound socket event definitions.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use civic_core::types::id::UserId;
use civic_entity::Notification;

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Present a credential to bind this channel to a user.
    Authenticate(AuthenticatePayload),
}

/// Payload of the `authenticate` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatePayload {
    /// Session token, optionally prefixed with `Bearer `.
    #[serde(default)]
    pub token: Option<String>,
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Handshake succeeded; the channel is bound to `user_id`.
    Authenticated {
        /// Always `true`.
        success: bool,
        /// Resolved local user id.
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    /// Handshake failed; the channel stays open and unauthenticated.
    AuthenticationError {
        /// Always `false`.
        success: bool,
        /// Client-facing failure reason.
        message: String,
    },
    /// One notification delivery.
    Notification(Notification),
    /// Protocol-level error for a frame the server could not accept.
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}

impl OutboundMessage {
    /// Successful handshake acknowledgement.
    pub fn authenticated(user_id: UserId) -> Self {
        Self::Authenticated {
            success: true,
            user_id,
        }
    }

    /// Failed handshake with a reason.
    pub fn authentication_error(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            success: false,
            message: message.into(),
        }
    }

    /// Protocol error frame.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Event name, for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Authenticated { .. } => "authenticated",
            Self::AuthenticationError { .. } => "authentication_error",
            Self::Notification(_) => "notification",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_authenticate_wire_format() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"event":"authenticate","data":{"token":"Bearer abc"}}"#)
                .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Authenticate(AuthenticatePayload {
                token: Some("Bearer abc".to_string())
            })
        );

        let empty: InboundMessage =
            serde_json::from_str(r#"{"event":"authenticate","data":{}}"#).unwrap();
        assert_eq!(empty, InboundMessage::Authenticate(AuthenticatePayload::default()));
    }

    #[test]
    fn test_outbound_wire_format() {
        let value = serde_json::to_value(OutboundMessage::authenticated(UserId::new("42"))).unwrap();
        assert_eq!(
            value,
            json!({"event": "authenticated", "data": {"success": true, "userId": "42"}})
        );

        let value =
            serde_json::to_value(OutboundMessage::authentication_error("No token provided")).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "authentication_error",
                "data": {"success": false, "message": "No token provided"}
            })
        );
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<InboundMessage>(r#"{"event":"subscribe","data":{}}"#).is_err());
    }
}
