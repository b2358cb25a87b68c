//! In-process identity provider for development and tests.

use async_trait::async_trait;
use dashmap::DashMap;

use civic_core::result::AppResult;
use civic_core::traits::identity::{IdentityProfile, IdentityProvider};

/// Identity provider backed by an in-memory set of subjects.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    profiles: DashMap<String, IdentityProfile>,
}

impl MemoryIdentityProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider knowing the given subjects.
    pub fn from_subjects(subjects: &[String]) -> Self {
        let provider = Self::new();
        for subject in subjects {
            provider.add_subject(subject);
        }
        provider
    }

    /// Register a subject.
    pub fn add_subject(&self, subject: &str) {
        self.profiles.insert(
            subject.to_string(),
            IdentityProfile {
                id: subject.to_string(),
                email: None,
            },
        );
    }

    /// Forget a subject.
    pub fn remove_subject(&self, subject: &str) {
        self.profiles.remove(subject);
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    fn provider_name(&self) -> &str {
        "memory"
    }

    async fn find_user(&self, subject: &str) -> AppResult<Option<IdentityProfile>> {
        Ok(self.profiles.get(subject).map(|p| p.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_and_unknown_subjects() {
        let provider = MemoryIdentityProvider::from_subjects(&["user_a".to_string()]);
        assert!(provider.find_user("user_a").await.unwrap().is_some());
        assert!(provider.find_user("user_b").await.unwrap().is_none());

        provider.remove_subject("user_a");
        assert!(provider.find_user("user_a").await.unwrap().is_none());
    }
}
