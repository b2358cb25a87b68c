//! File-backed durable pending store.
//!
//! Layout: `<root>/<user-key>.json`, a pretty-printed JSON array. Writes go
//! to a sibling temp file that is synced and renamed over the record, and
//! every read-modify-write for one user runs under that user's lock.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use civic_core::error::{AppError, ErrorKind};
use civic_core::result::AppResult;
use civic_core::sync::KeyedLock;
use civic_core::types::id::UserId;
use civic_entity::Notification;

use super::PendingStore;

/// Durable pending store keeping one JSON file per user.
#[derive(Debug)]
pub struct FilePendingStore {
    /// Directory holding the per-user records.
    root: PathBuf,
    /// Serializes read-modify-write cycles per user.
    locks: KeyedLock<UserId>,
}

impl FilePendingStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create notification store: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            locks: KeyedLock::new(),
        })
    }

    /// Path of the record for `user_id`.
    pub fn record_path(&self, user_id: &UserId) -> PathBuf {
        self.root.join(format!("{}.json", record_key(user_id)))
    }

    async fn read_record(&self, path: &Path) -> AppResult<Vec<Notification>> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read pending record");
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read pending record: {}", path.display()),
                    e,
                ));
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            error!(path = %path.display(), error = %e, "Pending record is corrupt");
            AppError::with_source(
                ErrorKind::Storage,
                format!("Pending record is corrupt: {}", path.display()),
                e,
            )
        })
    }

    async fn write_record(&self, path: &Path, items: &[Notification]) -> AppResult<()> {
        let body = serde_json::to_vec_pretty(items)?;
        let tmp = path.with_extension("json.tmp");

        let result: std::io::Result<()> = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(&body).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, path).await
        }
        .await;

        result.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to write pending record");
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write pending record: {}", path.display()),
                e,
            )
        })
    }
}

#[async_trait]
impl PendingStore for FilePendingStore {
    async fn append(&self, user_id: &UserId, notification: &Notification) -> AppResult<()> {
        let _guard = self.locks.lock(user_id).await;
        let path = self.record_path(user_id);

        let mut items = self.read_record(&path).await?;
        items.push(notification.clone());
        self.write_record(&path, &items).await?;

        debug!(
            user_id = %user_id,
            notification_id = %notification.id,
            pending = items.len(),
            "Persisted pending notification"
        );
        Ok(())
    }

    async fn drain_all(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        let _guard = self.locks.lock(user_id).await;
        let path = self.record_path(user_id);

        let items = self.read_record(&path).await?;
        if !items.is_empty() {
            self.write_record(&path, &[]).await?;
        }

        debug!(user_id = %user_id, count = items.len(), "Drained durable tier");
        Ok(items)
    }

    async fn restore(&self, user_id: &UserId, mut items: Vec<Notification>) -> AppResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        let _guard = self.locks.lock(user_id).await;
        let path = self.record_path(user_id);

        let newer = self.read_record(&path).await?;
        let restored = items.len();
        items.extend(newer);
        self.write_record(&path, &items).await?;

        debug!(user_id = %user_id, restored, "Restored undelivered notifications");
        Ok(())
    }

    async fn peek(&self, user_id: &UserId) -> AppResult<Vec<Notification>> {
        let _guard = self.locks.lock(user_id).await;
        self.read_record(&self.record_path(user_id)).await
    }
}

/// File-name-safe key for a user id.
///
/// Ids made only of `[A-Za-z0-9_-]` are used as-is; anything else is
/// hex-encoded behind a `~`, which cannot collide with a plain id.
fn record_key(user_id: &UserId) -> String {
    let raw = user_id.as_str();
    let plain = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if plain {
        return raw.to_string();
    }

    let mut key = String::with_capacity(1 + raw.len() * 2);
    key.push('~');
    for byte in raw.as_bytes() {
        let _ = write!(key, "{byte:02x}");
    }
    key
}
