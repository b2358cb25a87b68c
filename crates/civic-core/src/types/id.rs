//! Newtype identifiers for the delivery domain.
//!
//! Local user ids and notification ids are opaque strings on the wire, so
//! they wrap `String` rather than `Uuid`. Using distinct types prevents
//! accidentally passing a notification id where a user id is expected.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a single live channel.
pub type ConnectionId = Uuid;

/// Number of random hex characters in a generated notification id.
const NOTIFICATION_SUFFIX_LEN: usize = 9;

macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// Local user identifier (the relational store's primary key, as text).
    UserId
);

define_string_id!(
    /// Notification identifier, unique across concurrent submissions.
    NotificationId
);

impl NotificationId {
    /// Generate a fresh id: `notif_<epoch millis>_<random hex suffix>`.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "notif_{millis}_{}",
            &random[..NOTIFICATION_SUFFIX_LEN]
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_notification_id_shape() {
        let id = NotificationId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "notif");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), NOTIFICATION_SUFFIX_LEN);
    }

    #[test]
    fn test_generated_ids_do_not_collide() {
        let ids: HashSet<NotificationId> = (0..1000).map(|_| NotificationId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_user_id_serializes_transparently() {
        let id = UserId::new("u1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u1\"");
        let back: UserId = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(back, id);
    }
}
