//! Real-time channel and notification delivery configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Bounded outbound buffer per connection.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Maximum accepted inbound frame size in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// Notification delivery settings.
    #[serde(default)]
    pub notifications: NotificationDeliveryConfig,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            max_message_bytes: default_max_message_bytes(),
            notifications: NotificationDeliveryConfig::default(),
        }
    }
}

/// Pending-notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDeliveryConfig {
    /// Directory holding one durable pending record per user.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// Skip durable-tier items already pushed from the in-memory tier
    /// during the same drain pass.
    #[serde(default = "default_true")]
    pub dedup_on_drain: bool,
}

impl Default for NotificationDeliveryConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            dedup_on_drain: true,
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65_536
}

fn default_storage_dir() -> String {
    "data/notifications".to_string()
}

fn default_true() -> bool {
    true
}
