//! Identity verification configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider settings.
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Which identity provider backs the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityProviderKind {
    /// Hosted identity provider reached over its REST API.
    #[default]
    Clerk,
    /// In-process provider seeded from `known_subjects` (development and tests).
    Memory,
}

/// Identity provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Provider implementation.
    #[serde(default)]
    pub provider: IdentityProviderKind,
    /// Base URL of the provider's backend API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Backend secret key used as a bearer credential against the provider.
    #[serde(default)]
    pub secret_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Subjects known to the memory provider.
    #[serde(default)]
    pub known_subjects: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: IdentityProviderKind::default(),
            base_url: default_base_url(),
            secret_key: String::new(),
            timeout_seconds: default_timeout(),
            known_subjects: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.clerk.com".to_string()
}

fn default_timeout() -> u64 {
    10
}
