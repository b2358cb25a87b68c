//! # civic-entity
//!
//! Domain entity models for the notification delivery core.

pub mod notification;

pub use notification::{NewNotification, Notification, NotificationReferences, ReferenceId};
