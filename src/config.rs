use std::{env, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;
use url::Url;

pub const ENV_PAGE_URL: &str = "TIMETABLE_SITES_LINK";
pub const ENV_CONTAINER_PREFIX: &str = "TIMETABLE_SITES_DOWNLOAD_BUTTON_ID";
pub const ENV_DOWNLOAD_HOST: &str = "TIMETABLE_DOWNLOAD_HOST";
pub const ENV_SHEET_PATH: &str = "TIMETABLE_SHEET_PATH";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "FETCH_MAX_RETRIES";
pub const ENV_BACKOFF_MS: &str = "FETCH_BACKOFF_MS";

const DEFAULT_DOWNLOAD_HOST: &str = "https://sites.google.com";
const DEFAULT_SHEET_PATH: &str = "./sheet.xlsx";
const DEFAULT_DATABASE_URL: &str = "sqlite://timetable.db?mode=rwc";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Bounded retry policy for the two HTTP calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Page that links to the current timetable file.
    pub page_url: Url,
    /// Id prefix of the container holding the download anchor.
    pub container_id_prefix: String,
    /// Host the anchor's relative href is resolved against.
    pub download_host: Url,
    /// Fixed local path the spreadsheet is written to on every run.
    pub sheet_path: PathBuf,
    pub database_url: String,
    pub http_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` is this over `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let page_url = parse_as(ENV_PAGE_URL, required(ENV_PAGE_URL)?)?;
        let container_id_prefix = required(ENV_CONTAINER_PREFIX)?.trim().to_string();
        let download_host = parse_as(
            ENV_DOWNLOAD_HOST,
            lookup(ENV_DOWNLOAD_HOST).unwrap_or_else(|| DEFAULT_DOWNLOAD_HOST.to_string()),
        )?;
        let sheet_path = lookup(ENV_SHEET_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SHEET_PATH));
        let database_url =
            lookup(ENV_DATABASE_URL).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let timeout_secs: u64 = optional(&lookup, ENV_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS)?;
        let max_retries: u32 = optional(&lookup, ENV_MAX_RETRIES, DEFAULT_MAX_RETRIES)?;
        let backoff_ms: u64 = optional(&lookup, ENV_BACKOFF_MS, DEFAULT_BACKOFF_MS)?;

        Ok(Self {
            page_url,
            container_id_prefix,
            download_host,
            sheet_path,
            database_url,
            http_timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy {
                max_retries,
                initial_backoff: Duration::from_millis(backoff_ms),
            },
        })
    }
}

fn parse_as<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

fn optional<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => parse_as(key, v),
        None => Ok(default),
    }
}
