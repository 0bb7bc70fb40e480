//! Download models: supported platforms and formats, the download request
//! body, the persisted download record and per-key usage statistics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A string that does not name a known platform or format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported value `{0}`")]
pub struct UnknownVariant(pub String);

/// Media platform a download is requested for.
///
/// Chosen by the route (`/api/download/{platform}`), never by the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Facebook,
    Tiktok,
    Instagram,
    Spotify,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Youtube,
        Platform::Facebook,
        Platform::Tiktok,
        Platform::Instagram,
        Platform::Spotify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Spotify => "spotify",
        }
    }

    /// Format used when the request omits `type`.
    ///
    /// Spotify is audio-only, so it defaults to mp3; everything else to mp4.
    pub fn default_format(&self) -> MediaFormat {
        match self {
            Platform::Spotify => MediaFormat::Mp3,
            _ => MediaFormat::Mp4,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl TryFrom<String> for Platform {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Output container requested from the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp3,
    Mp4,
    M4a,
    Wav,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 4] = [
        MediaFormat::Mp3,
        MediaFormat::Mp4,
        MediaFormat::M4a,
        MediaFormat::Wav,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
            MediaFormat::M4a => "m4a",
            MediaFormat::Wav => "wav",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl TryFrom<String> for MediaFormat {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Request body for `POST /api/download/{platform}`.
///
/// ```json
/// {
///   "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
///   "type": "mp3"
/// }
/// ```
///
/// Both fields are optional at the JSON level so that a missing `url` is
/// reported as a 400 by validation rather than as a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    pub url: Option<String>,

    #[serde(rename = "type")]
    pub format: Option<String>,
}

/// One completed worker run, successful or not.
///
/// # Database Table
///
/// Maps to the append-only `downloads` table. Rows are written after the
/// worker returns a parseable result and are never updated or deleted.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    pub id: Uuid,

    /// The API key value the request was made with
    pub key_value: String,

    #[sqlx(try_from = "String")]
    pub platform: Platform,

    pub url: String,

    #[sqlx(try_from = "String")]
    pub format: MediaFormat,

    /// The worker's own `success` flag
    pub success: bool,

    pub file_path: Option<String>,

    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a download record.
#[derive(Debug, Clone)]
pub struct NewDownloadRecord {
    pub key_value: String,
    pub platform: Platform,
    pub url: String,
    pub format: MediaFormat,
    pub success: bool,
    pub file_path: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated download counts for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct KeyUsage {
    /// All attempts ever recorded
    pub total: i64,

    /// Attempts the worker reported as successful
    pub successful: i64,

    /// Attempts recorded since the start of the current quota window
    pub today: i64,
}

/// Response body for `GET /api/stats`.
///
/// ```json
/// {
///   "totalDownloads": 3,
///   "successfulDownloads": 2,
///   "todayDownloads": 2,
///   "dailyLimit": 100,
///   "remainingToday": 98
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_downloads: i64,
    pub successful_downloads: i64,
    pub today_downloads: i64,
    pub daily_limit: i64,

    /// Signed on purpose: concurrent admissions can push usage past the limit.
    pub remaining_today: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_lowercase_names_only() {
        assert_eq!("tiktok".parse::<Platform>(), Ok(Platform::Tiktok));
        assert_eq!(
            "TikTok".parse::<Platform>(),
            Err(UnknownVariant("TikTok".to_string()))
        );
        assert!("vimeo".parse::<Platform>().is_err());
    }

    #[test]
    fn spotify_defaults_to_mp3_and_others_to_mp4() {
        for platform in Platform::ALL {
            let expected = if platform == Platform::Spotify {
                MediaFormat::Mp3
            } else {
                MediaFormat::Mp4
            };
            assert_eq!(platform.default_format(), expected, "{platform}");
        }
    }

    #[test]
    fn format_accepts_only_the_four_containers() {
        for name in ["mp3", "mp4", "m4a", "wav"] {
            assert_eq!(name.parse::<MediaFormat>().unwrap().as_str(), name);
        }
        for name in ["flac", "MP3", "", "mp4 "] {
            assert!(name.parse::<MediaFormat>().is_err(), "{name:?}");
        }
    }

    #[test]
    fn download_request_reads_type_field() {
        let request: DownloadRequest =
            serde_json::from_str(r#"{"url":"https://y/watch?v=1","type":"wav"}"#).unwrap();
        assert_eq!(request.url.as_deref(), Some("https://y/watch?v=1"));
        assert_eq!(request.format.as_deref(), Some("wav"));

        let empty: DownloadRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.url.is_none());
        assert!(empty.format.is_none());
    }

    #[test]
    fn stats_response_uses_camel_case() {
        let stats = StatsResponse {
            total_downloads: 3,
            successful_downloads: 2,
            today_downloads: 2,
            daily_limit: 100,
            remaining_today: 98,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalDownloads"], 3);
        assert_eq!(value["remainingToday"], 98);
    }
}
