//! Request DTOs with validation.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use civic_entity::{NewNotification, NotificationReferences, ReferenceId};

/// Returned when any required submission field is missing or empty.
pub const REQUIRED_FIELDS_MESSAGE: &str =
    "user_id, notification_type, and notification_content are required";

/// Notification submission body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SubmitNotificationRequest {
    /// Target user; a JSON string or number, kept in that form.
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(
        required(message = "user_id, notification_type, and notification_content are required"),
        custom(function = "non_blank_recipient")
    )]
    pub user_id: Option<ReferenceId>,
    /// Free-form type tag.
    #[serde(default)]
    #[validate(
        required(message = "user_id, notification_type, and notification_content are required"),
        length(min = 1, message = "user_id, notification_type, and notification_content are required")
    )]
    pub notification_type: Option<String>,
    /// Free-form content.
    #[serde(default)]
    #[validate(
        required(message = "user_id, notification_type, and notification_content are required"),
        length(min = 1, message = "user_id, notification_type, and notification_content are required")
    )]
    pub notification_content: Option<String>,
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

impl SubmitNotificationRequest {
    /// Converts a validated request into the notification input.
    ///
    /// Returns `None` if a required field is absent, which validation
    /// already rules out.
    pub fn into_new_notification(self) -> Option<NewNotification> {
        Some(NewNotification {
            user_id: self.user_id?,
            notification_type: self.notification_type?,
            notification_content: self.notification_content?,
            references: NotificationReferences {
                issue_id: self.issue_id,
                authority_id: self.authority_id,
                appointment_id: self.appointment_id,
            },
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Accepts `"42"`, `42` or `null`. Integers stay numeric; any other number
/// becomes its decimal text.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<ReferenceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::Text(s) => ReferenceId::Text(s.trim().to_string()),
        StringOrNumber::Number(n) => match n.as_i64() {
            Some(i) => ReferenceId::Number(i),
            None => ReferenceId::Text(n.to_string()),
        },
    }))
}

fn non_blank_recipient(value: &ReferenceId) -> Result<(), ValidationError> {
    match value {
        ReferenceId::Text(s) if s.is_empty() => {
            Err(ValidationError::new("length").with_message(Cow::Borrowed(REQUIRED_FIELDS_MESSAGE)))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> SubmitNotificationRequest {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_valid_request() {
        let req = parse(
            r#"{"user_id":"u1","notification_type":"issue_update","notification_content":"Resolved","issue_id":12}"#,
        );
        assert!(req.validate().is_ok());

        let input = req.into_new_notification().unwrap();
        assert_eq!(input.user_id, ReferenceId::Text("u1".to_string()));
        assert_eq!(input.references.issue_id, Some(ReferenceId::Number(12)));
        assert_eq!(input.references.authority_id, None);
    }

    #[test]
    fn test_numeric_user_id_stays_numeric() {
        let req = parse(r#"{"user_id":42,"notification_type":"t","notification_content":"c"}"#);
        assert_eq!(req.user_id, Some(ReferenceId::Number(42)));
        assert!(req.validate().is_ok());

        let padded = parse(r#"{"user_id":"  u7 ","notification_type":"t","notification_content":"c"}"#);
        assert_eq!(padded.user_id, Some(ReferenceId::Text("u7".to_string())));
    }

    #[test]
    fn test_missing_or_empty_fields_fail() {
        for raw in [
            r#"{"notification_type":"t","notification_content":"c"}"#,
            r#"{"user_id":"u1","notification_content":"c"}"#,
            r#"{"user_id":"u1","notification_type":"t"}"#,
            r#"{"user_id":"","notification_type":"t","notification_content":"c"}"#,
            r#"{"user_id":null,"notification_type":"t","notification_content":"c"}"#,
            r#"{"user_id":"   ","notification_type":"t","notification_content":"c"}"#,
        ] {
            let errors = parse(raw).validate().unwrap_err();
            let messages: Vec<String> = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            assert!(messages.iter().all(|m| m == REQUIRED_FIELDS_MESSAGE), "{raw}");
            assert!(!messages.is_empty(), "{raw}");
        }
    }
}
