//! Record store abstraction.
//!
//! Handlers and services never talk to the database directly; they go through
//! a [`RecordStore`] handed to them at startup. [`postgres::PgStore`] is the
//! production implementation, [`memory::MemoryStore`] backs tests and
//! database-less runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    api_key::{ApiKey, NewApiKey},
    download::{DownloadRecord, KeyUsage, NewDownloadRecord},
    user::{NewUser, User},
};

/// Errors raised by a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique field (username, email, key value) is already taken.
    #[error("Duplicate value for {0}")]
    Duplicate(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for users, API keys and download records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Cheap connectivity check used by the health endpoint.
    async fn ping(&self) -> StoreResult<()>;

    // Users
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    // API keys
    async fn create_api_key(&self, key: NewApiKey) -> StoreResult<ApiKey>;
    async fn list_api_keys(&self, user_id: Uuid) -> StoreResult<Vec<ApiKey>>;

    /// Soft-deletes a key owned by `user_id`. Returns `false` when no such key exists.
    async fn deactivate_api_key(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn find_active_api_key(&self, key_value: &str) -> StoreResult<Option<ApiKey>>;

    /// Adds one to `request_count` and returns the new value.
    async fn increment_request_count(&self, id: Uuid) -> StoreResult<i64>;

    // Download records
    async fn insert_download(&self, record: NewDownloadRecord) -> StoreResult<DownloadRecord>;

    /// Number of records for `key_value` created at or after `since`.
    async fn count_downloads_since(&self, key_value: &str, since: DateTime<Utc>)
    -> StoreResult<i64>;

    /// Totals for `key_value`; `today` counts records created at or after `since`.
    async fn download_usage(&self, key_value: &str, since: DateTime<Utc>) -> StoreResult<KeyUsage>;
}
