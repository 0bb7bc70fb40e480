//! PostgreSQL record store built on sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult};
use crate::{
    db::DbPool,
    models::{
        api_key::{ApiKey, NewApiKey},
        download::{DownloadRecord, KeyUsage, NewDownloadRecord},
        user::{NewUser, User},
    },
};

const API_KEY_COLUMNS: &str =
    "id, user_id, key_name, key_value, is_active, request_count, daily_limit, created_at";

/// Record store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate unique-constraint violations into `StoreError::Duplicate`.
fn map_unique(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(what.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "username or email"))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_api_key(&self, key: NewApiKey) -> StoreResult<ApiKey> {
        sqlx::query_as::<_, ApiKey>(&format!(
            r#"
            INSERT INTO api_keys (user_id, key_name, key_value, daily_limit)
            VALUES ($1, $2, $3, $4)
            RETURNING {API_KEY_COLUMNS}
            "#
        ))
        .bind(key.user_id)
        .bind(key.key_name)
        .bind(key.key_value)
        .bind(key.daily_limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, "key_value"))
    }

    async fn list_api_keys(&self, user_id: Uuid) -> StoreResult<Vec<ApiKey>> {
        let keys = sqlx::query_as::<_, ApiKey>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn deactivate_api_key(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE api_keys SET is_active = false WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_active_api_key(&self, key_value: &str) -> StoreResult<Option<ApiKey>> {
        let key = sqlx::query_as::<_, ApiKey>(&format!(
            "SELECT {API_KEY_COLUMNS} FROM api_keys WHERE key_value = $1 AND is_active = true"
        ))
        .bind(key_value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn increment_request_count(&self, id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "UPDATE api_keys SET request_count = request_count + 1 WHERE id = $1 RETURNING request_count",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert_download(&self, record: NewDownloadRecord) -> StoreResult<DownloadRecord> {
        let record = sqlx::query_as::<_, DownloadRecord>(
            r#"
            INSERT INTO downloads (key_value, platform, url, format, success, file_path, error, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, key_value, platform, url, format, success, file_path, error, created_at
            "#,
        )
        .bind(record.key_value)
        .bind(record.platform.as_str())
        .bind(record.url)
        .bind(record.format.as_str())
        .bind(record.success)
        .bind(record.file_path)
        .bind(record.error)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn count_downloads_since(
        &self,
        key_value: &str,
        since: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM downloads WHERE key_value = $1 AND created_at >= $2",
        )
        .bind(key_value)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn download_usage(&self, key_value: &str, since: DateTime<Utc>) -> StoreResult<KeyUsage> {
        let usage = sqlx::query_as::<_, KeyUsage>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE success) AS successful,
                COUNT(*) FILTER (WHERE created_at >= $2) AS today
            FROM downloads
            WHERE key_value = $1
            "#,
        )
        .bind(key_value)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(usage)
    }
}
