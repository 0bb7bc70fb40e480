//! Quota guard - API key validation and daily quota enforcement.
//!
//! # Quota Window
//!
//! Usage is counted from local midnight of the current day. The count comes
//! from download records, while the key's `request_count` is bumped on every
//! admitted request; the two drift apart whenever a worker run fails before a
//! record is written.
//!
//! # Concurrency
//!
//! The check (count today's records) and the act (increment `request_count`)
//! are separate store calls with no lock between them. Concurrent requests on
//! the same key near its limit can all be admitted. That over-admission is
//! accepted; `remaining_today` in the stats report may go negative as a result.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{error::AppError, models::api_key::ApiKey, store::RecordStore};

/// Validates API keys and enforces their daily download limit.
#[derive(Clone)]
pub struct QuotaGuard {
    store: Arc<dyn RecordStore>,
}

impl QuotaGuard {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Resolve a presented key value to its active record.
    ///
    /// # Errors
    ///
    /// - `MissingCredential`: no value (or a blank one) was presented; the store is not touched
    /// - `InvalidApiKey`: no active key has this value
    pub async fn authenticate(&self, key_value: Option<&str>) -> Result<ApiKey, AppError> {
        let key_value = key_value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::MissingCredential("API key"))?;

        self.store
            .find_active_api_key(key_value)
            .await?
            .ok_or(AppError::InvalidApiKey)
    }

    /// Admit one request against an authenticated key.
    ///
    /// # Process
    ///
    /// 1. Count download records for the key since local midnight
    /// 2. Reject with `QuotaExceeded` if the count reached `daily_limit`
    /// 3. Otherwise increment `request_count` and return the updated record
    ///
    /// A rejected request leaves `request_count` untouched. An admitted one
    /// counts even if the download later fails.
    pub async fn admit(&self, key: &ApiKey) -> Result<ApiKey, AppError> {
        let since = start_of_local_day(Local::now());
        let used_today = self
            .store
            .count_downloads_since(&key.key_value, since)
            .await?;

        if used_today >= key.daily_limit {
            tracing::warn!(
                key_id = %key.id,
                used_today,
                daily_limit = key.daily_limit,
                "daily quota exceeded"
            );
            return Err(AppError::QuotaExceeded);
        }

        let request_count = self.store.increment_request_count(key.id).await?;

        Ok(ApiKey {
            request_count,
            ..key.clone()
        })
    }

    /// Full quota check: [`authenticate`](Self::authenticate) followed by [`admit`](Self::admit).
    pub async fn check(&self, key_value: Option<&str>) -> Result<ApiKey, AppError> {
        let key = self.authenticate(key_value).await?;
        self.admit(&key).await
    }
}

/// Midnight of the calendar day containing `now`, in `now`'s time zone, as UTC.
///
/// When local midnight does not exist (a DST jump at 00:00) the naive
/// midnight is read as UTC instead.
pub fn start_of_local_day<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN);

    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
