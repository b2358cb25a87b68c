//! Hosted identity provider reached over its backend REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use civic_core::config::IdentityConfig;
use civic_core::error::{AppError, ErrorKind};
use civic_core::result::AppResult;
use civic_core::traits::identity::{IdentityProfile, IdentityProvider};

/// User object as returned by `GET /v1/users/{id}`.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ProviderEmail>,
}

#[derive(Debug, Deserialize)]
struct ProviderEmail {
    id: String,
    email_address: String,
}

impl From<ProviderUser> for IdentityProfile {
    fn from(user: ProviderUser) -> Self {
        let email = user
            .email_addresses
            .iter()
            .find(|e| Some(&e.id) == user.primary_email_address_id.as_ref())
            .or_else(|| user.email_addresses.first())
            .map(|e| e.email_address.clone());
        Self { id: user.id, email }
    }
}

/// Identity provider client over HTTP.
#[derive(Clone)]
pub struct ClerkIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl std::fmt::Debug for ClerkIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkIdentityProvider")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ClerkIdentityProvider {
    /// Creates a client from configuration.
    pub fn new(config: &IdentityConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build identity provider client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// URL of the user resource for `subject`.
    fn user_url(&self, subject: &str) -> String {
        format!("{}/v1/users/{}", self.base_url, subject)
    }
}

/// Provider user ids are opaque but URL-safe; anything else cannot exist there.
fn is_valid_subject(subject: &str) -> bool {
    !subject.is_empty()
        && subject
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[async_trait]
impl IdentityProvider for ClerkIdentityProvider {
    fn provider_name(&self) -> &str {
        "clerk"
    }

    async fn find_user(&self, subject: &str) -> AppResult<Option<IdentityProfile>> {
        if !is_valid_subject(subject) {
            debug!(subject, "Rejecting subject with unexpected characters");
            return Ok(None);
        }

        let response = self
            .client
            .get(self.user_url(subject))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Identity provider request failed",
                    e,
                )
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let user: ProviderUser = response.json().await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::ExternalService,
                        "Identity provider returned an unreadable user",
                        e,
                    )
                })?;
                Ok(Some(user.into()))
            }
            status => Err(AppError::external_service(format!(
                "Identity provider responded with {status}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;

    use super::*;

    async fn mock_user(Path(id): Path<String>) -> Result<axum::Json<serde_json::Value>, AxumStatus> {
        match id.as_str() {
            "user_ok" => Ok(axum::Json(serde_json::json!({
                "id": "user_ok",
                "primary_email_address_id": "em_2",
                "email_addresses": [
                    { "id": "em_1", "email_address": "old@example.org" },
                    { "id": "em_2", "email_address": "citizen@example.org" }
                ]
            }))),
            "user_broken" => Err(AxumStatus::INTERNAL_SERVER_ERROR),
            _ => Err(AxumStatus::NOT_FOUND),
        }
    }

    async fn spawn_mock() -> String {
        let app = Router::new().route("/v1/users/{id}", get(mock_user));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider(base_url: String) -> ClerkIdentityProvider {
        ClerkIdentityProvider::new(&IdentityConfig {
            base_url,
            secret_key: "sk_test".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_found_user_uses_primary_email() {
        let provider = provider(spawn_mock().await);
        let profile = provider.find_user("user_ok").await.unwrap().unwrap();
        assert_eq!(profile.id, "user_ok");
        assert_eq!(profile.email.as_deref(), Some("citizen@example.org"));
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let provider = provider(spawn_mock().await);
        assert!(provider.find_user("user_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_external_service() {
        let provider = provider(spawn_mock().await);
        let err = provider.find_user("user_broken").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }

    #[tokio::test]
    async fn test_unsafe_subject_short_circuits() {
        let provider = provider("http://127.0.0.1:1".to_string());
        assert!(provider.find_user("../admin").await.unwrap().is_none());
    }

    #[test]
    fn test_user_url_trims_trailing_slash() {
        let provider = provider("https://api.example.org/".to_string());
        assert_eq!(
            provider.user_url("user_1"),
            "https://api.example.org/v1/users/user_1"
        );
    }
}
