//! In-memory record store for development and testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{
    api_key::{ApiKey, NewApiKey},
    download::{DownloadRecord, KeyUsage, NewDownloadRecord},
    user::{NewUser, User},
};

/// Record store kept entirely in process memory.
///
/// Enforces the same uniqueness rules as the database schema. Nothing survives
/// a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    api_keys: DashMap<Uuid, ApiKey>,
    downloads: DashMap<Uuid, DownloadRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a key by id regardless of its active flag.
    pub fn api_key(&self, id: Uuid) -> Option<ApiKey> {
        self.api_keys.get(&id).map(|entry| entry.value().clone())
    }

    /// All download records for `key_value`, oldest first.
    pub fn downloads_for(&self, key_value: &str) -> Vec<DownloadRecord> {
        let mut records: Vec<DownloadRecord> = self
            .downloads
            .iter()
            .filter(|entry| entry.key_value == key_value)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.created_at);
        records
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let taken = self
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(StoreError::Duplicate("username or email".to_string()));
        }

        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        self.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }

    async fn create_api_key(&self, key: NewApiKey) -> StoreResult<ApiKey> {
        if self.api_keys.iter().any(|k| k.key_value == key.key_value) {
            return Err(StoreError::Duplicate("key_value".to_string()));
        }

        let record = ApiKey {
            id: Uuid::new_v4(),
            user_id: key.user_id,
            key_name: key.key_name,
            key_value: key.key_value,
            is_active: true,
            request_count: 0,
            daily_limit: key.daily_limit,
            created_at: Utc::now(),
        };
        self.api_keys.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_api_keys(&self, user_id: Uuid) -> StoreResult<Vec<ApiKey>> {
        let mut keys: Vec<ApiKey> = self
            .api_keys
            .iter()
            .filter(|k| k.user_id == user_id)
            .map(|k| k.value().clone())
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn deactivate_api_key(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        match self.api_keys.get_mut(&id) {
            Some(mut key) if key.user_id == user_id => {
                key.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_active_api_key(&self, key_value: &str) -> StoreResult<Option<ApiKey>> {
        Ok(self
            .api_keys
            .iter()
            .find(|k| k.key_value == key_value && k.is_active)
            .map(|k| k.value().clone()))
    }

    async fn increment_request_count(&self, id: Uuid) -> StoreResult<i64> {
        let mut key = self
            .api_keys
            .get_mut(&id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        key.request_count += 1;
        Ok(key.request_count)
    }

    async fn insert_download(&self, record: NewDownloadRecord) -> StoreResult<DownloadRecord> {
        let record = DownloadRecord {
            id: Uuid::new_v4(),
            key_value: record.key_value,
            platform: record.platform,
            url: record.url,
            format: record.format,
            success: record.success,
            file_path: record.file_path,
            error: record.error,
            created_at: record.created_at,
        };
        self.downloads.insert(record.id, record.clone());
        Ok(record)
    }

    async fn count_downloads_since(
        &self,
        key_value: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let count = self
            .downloads
            .iter()
            .filter(|d| d.key_value == key_value && d.created_at >= since)
            .count();
        Ok(count as i64)
    }

    async fn download_usage(&self, key_value: &str, since: DateTime<Utc>) -> StoreResult<KeyUsage> {
        let usage = self
            .downloads
            .iter()
            .filter(|d| d.key_value == key_value)
            .fold(KeyUsage::default(), |mut usage, d| {
                usage.total += 1;
                if d.success {
                    usage.successful += 1;
                }
                if d.created_at >= since {
                    usage.today += 1;
                }
                usage
            });
        Ok(usage)
    }
}
