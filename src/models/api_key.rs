//! API key model.
//!
//! An API key is a quota bucket owned by a user. Callers present the raw key
//! value in the `X-API-Key` header when requesting downloads or statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily download allowance given to newly generated keys.
pub const DEFAULT_DAILY_LIMIT: i64 = 100;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `user_id`: Owner of the key
/// - `key_name`: Label chosen by the owner
/// - `key_value`: The secret presented by callers (`api_` + 64 hex characters)
/// - `is_active`: Whether the key is currently accepted
/// - `request_count`: Number of requests admitted by the quota check
/// - `daily_limit`: Download attempts allowed per local calendar day
/// - `created_at`: When the key was created
///
/// Serialized with the camelCase field names clients already rely on
/// (`keyName`, `apiKey`, `isActive`, ...).
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: Uuid,

    pub user_id: Uuid,

    pub key_name: String,

    #[serde(rename = "apiKey")]
    pub key_value: String,

    /// Inactive keys are rejected during authentication. Keys are deactivated,
    /// never deleted, so download history stays attributable.
    pub is_active: bool,

    /// Incremented once per request admitted by the quota check, whether or
    /// not the download itself succeeds.
    pub request_count: i64,

    pub daily_limit: i64,

    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a new API key.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub user_id: Uuid,
    pub key_name: String,
    pub key_value: String,
    pub daily_limit: i64,
}

/// Request body for `POST /api/keys/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyRequest {
    #[serde(default)]
    pub key_name: String,
}

/// Response body for `POST /api/keys/generate`.
///
/// ```json
/// {
///   "apiKey": "api_3f9c...",
///   "keyName": "my laptop"
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateKeyResponse {
    pub api_key: String,
    pub key_name: String,
}
