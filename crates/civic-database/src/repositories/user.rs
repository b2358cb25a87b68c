//! Local user lookups by external identity.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

use civic_core::error::{AppError, ErrorKind};
use civic_core::result::AppResult;
use civic_core::traits::directory::{LocalUser, UserDirectory};
use civic_core::types::id::UserId;

/// Repository over the shared `"User"` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<LocalUser>> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"SELECT user_id::text, clerk_user_id FROM "User" WHERE clerk_user_id = $1"#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find user by external id",
                e,
            )
        })?;

        Ok(row.map(|(user_id, external_id)| LocalUser {
            user_id: UserId::new(user_id),
            external_id,
        }))
    }
}

/// In-process user directory for development and tests.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: DashMap<String, UserId>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory seeded from an external id → local id map.
    pub fn from_map(users: &HashMap<String, String>) -> Self {
        let directory = Self::new();
        for (external_id, user_id) in users {
            directory.insert(external_id, UserId::new(user_id.as_str()));
        }
        directory
    }

    /// Link an external identity to a local user.
    pub fn insert(&self, external_id: &str, user_id: UserId) {
        self.users.insert(external_id.to_string(), user_id);
    }

    /// Remove a link.
    pub fn remove(&self, external_id: &str) {
        self.users.remove(external_id);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<LocalUser>> {
        Ok(self.users.get(external_id).map(|entry| LocalUser {
            user_id: entry.value().clone(),
            external_id: external_id.to_string(),
        }))
    }
}
