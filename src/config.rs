//! Application configuration management.
//!
//! Configuration is read from environment variables with the `envy` crate,
//! after an optional `.env` file has been loaded by `dotenvy`.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `JWT_SECRET` (required): shared secret used to sign bearer tokens
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): PostgreSQL pool size, defaults to 5
/// - `TOKEN_TTL_HOURS` (optional): bearer token validity, defaults to 24
/// - `BCRYPT_COST` (optional): password hashing cost, defaults to 12
/// - `WORKER_PROGRAM` (optional): executable that runs the download worker, defaults to `python3`
/// - `WORKER_SCRIPT` (optional): script passed as the first worker argument, defaults to `download_service.py`
/// - `WORKER_TIMEOUT_SECS` (optional): hard timeout per worker run, defaults to 60
/// - `MAX_CONCURRENT_WORKERS` (optional): worker processes allowed at once, defaults to 4
/// - `DOWNLOADS_DIR` (optional): directory served under `/downloads`, defaults to `downloads`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub jwt_secret: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default = "default_worker_program")]
    pub worker_program: String,

    #[serde(default = "default_worker_script")]
    pub worker_script: String,

    #[serde(default = "default_worker_timeout_secs")]
    pub worker_timeout_secs: u64,

    #[serde(default = "default_max_concurrent_workers")]
    pub max_concurrent_workers: usize,

    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
}

fn default_port() -> u16 {
    3000
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_worker_program() -> String {
    "python3".to_string()
}

fn default_worker_script() -> String {
    "download_service.py".to_string()
}

fn default_worker_timeout_secs() -> u64 {
    60
}

fn default_max_concurrent_workers() -> usize {
    4
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (`DATABASE_URL`, `JWT_SECRET`)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are converted automatically: worker_timeout_secs -> WORKER_TIMEOUT_SECS
        envy::from_env::<Config>()
    }
}
