//! Notification entity model.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use civic_core::types::id::{NotificationId, UserId};

/// Reference to a record in the relational store.
///
/// Producers send numeric primary keys, but opaque string keys are accepted
/// too; the original JSON form is preserved on delivery. Recipients use the
/// same type so a numeric `user_id` is echoed back as a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceId {
    /// Integer primary key.
    Number(i64),
    /// Opaque string key.
    Text(String),
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Optional correlating references carried by a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationReferences {
    /// Related issue.
    #[serde(default)]
    pub issue_id: Option<ReferenceId>,
    /// Related authority.
    #[serde(default)]
    pub authority_id: Option<ReferenceId>,
    /// Related appointment.
    #[serde(default)]
    pub appointment_id: Option<ReferenceId>,
}

/// Validated input for creating a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Recipient, in the form the producer sent it.
    pub user_id: ReferenceId,
    /// Free-form type tag.
    pub notification_type: String,
    /// Free-form content.
    pub notification_content: String,
    /// Correlating references.
    pub references: NotificationReferences,
}

/// The unit of delivery.
///
/// Immutable once created: delivery only moves the record between queue
/// tiers or removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification id.
    pub id: NotificationId,
    /// Recipient, in the form the producer sent it.
    pub user_id: ReferenceId,
    /// Free-form type tag.
    pub notification_type: String,
    /// Free-form content.
    pub notification_content: String,
    /// Related issue.
    pub issue_id: Option<ReferenceId>,
    /// Related authority.
    pub authority_id: Option<ReferenceId>,
    /// Related appointment.
    pub appointment_id: Option<ReferenceId>,
    /// Creation time (RFC 3339, millisecond precision).
    pub timestamp: DateTime<Utc>,
    /// Client-side read flag; always `false` when created here.
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    /// Build a notification with a fresh id and the current timestamp.
    pub fn create(input: NewNotification) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id: input.user_id,
            notification_type: input.notification_type,
            notification_content: input.notification_content,
            issue_id: input.references.issue_id,
            authority_id: input.references.authority_id,
            appointment_id: input.references.appointment_id,
            timestamp: Utc::now().trunc_subsecs(3),
            read: false,
        }
    }

    /// The local user this notification is addressed to.
    pub fn recipient(&self) -> UserId {
        UserId::new(self.user_id.to_string())
    }
}
