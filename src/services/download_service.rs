//! Download service - validates a download request, runs the worker and
//! records the attempt.
//!
//! # Process
//!
//! 1. Validate `url` (required) and `type` (one of mp3, mp4, m4a, wav)
//! 2. Run the worker through the [`DownloadBridge`]
//! 3. Append a download record, whether the worker reported success or not
//! 4. Hand the worker's JSON back verbatim
//!
//! Validation failures never reach the worker. Bridge failures (crash,
//! timeout, malformed output) write no record.

use chrono::Utc;
use serde_json::Value;

use crate::{
    error::AppError,
    models::download::{DownloadRequest, MediaFormat, NewDownloadRecord, Platform},
    services::download_bridge::DownloadBridge,
    store::RecordStore,
};

/// Validated download parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub platform: Platform,
    pub url: String,
    pub format: MediaFormat,
}

impl DownloadJob {
    /// Check a request body for `platform`.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest("url is required")`: url missing or blank
    /// - `InvalidRequest("invalid format type ...")`: type outside the allowed set
    pub fn from_request(platform: Platform, request: DownloadRequest) -> Result<Self, AppError> {
        let url = request
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::InvalidRequest("url is required".to_string()))?;

        let format = match request.format {
            None => platform.default_format(),
            Some(raw) => raw.parse::<MediaFormat>().map_err(|_| {
                AppError::InvalidRequest(format!(
                    "invalid format type `{raw}`; expected one of mp3, mp4, m4a, wav"
                ))
            })?,
        };

        Ok(Self {
            platform,
            url,
            format,
        })
    }
}

/// Perform one download for `key_value` and return the worker's JSON.
pub async fn execute(
    store: &dyn RecordStore,
    bridge: &DownloadBridge,
    key_value: &str,
    platform: Platform,
    request: DownloadRequest,
) -> Result<Value, AppError> {
    let job = DownloadJob::from_request(platform, request)?;

    let outcome = bridge.invoke(job.platform, &job.url, job.format).await?;

    store
        .insert_download(NewDownloadRecord {
            key_value: key_value.to_string(),
            platform: job.platform,
            url: job.url,
            format: job.format,
            success: outcome.success,
            file_path: outcome.file_path,
            error: outcome.error,
            created_at: Utc::now(),
        })
        .await?;

    Ok(outcome.payload)
}
