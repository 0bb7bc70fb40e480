//! Per-key usage statistics. Read-only: nothing here touches counters.

use chrono::{DateTime, Local, TimeZone};

use crate::{
    error::AppError,
    models::{api_key::ApiKey, download::StatsResponse},
    services::quota_service::start_of_local_day,
    store::RecordStore,
};

/// Usage report for `key` as of now.
pub async fn key_stats(store: &dyn RecordStore, key: &ApiKey) -> Result<StatsResponse, AppError> {
    key_stats_at(store, key, Local::now()).await
}

/// Usage report for `key` with "today" taken as the calendar day of `now`.
///
/// `remaining_today` is `daily_limit - today` without clamping.
pub async fn key_stats_at<Tz: TimeZone>(
    store: &dyn RecordStore,
    key: &ApiKey,
    now: DateTime<Tz>,
) -> Result<StatsResponse, AppError> {
    let usage = store
        .download_usage(&key.key_value, start_of_local_day(now))
        .await?;

    Ok(StatsResponse {
        total_downloads: usage.total,
        successful_downloads: usage.successful,
        today_downloads: usage.today,
        daily_limit: key.daily_limit,
        remaining_today: key.daily_limit - usage.today,
    })
}
