//! Process configuration loaded from environment variables

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "sales";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: String,
    pub database_url: String,
    pub endpoint: String,
    pub http_timeout: Duration,
    pub db_connect_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests don't touch the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a whole number of seconds", key)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Config {
            api_base_url: required("API_BASE_URL")?,
            api_key: required("API_KEY")?,
            database_url: required("DATABASE_URL")?,
            endpoint: lookup("SALES_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            http_timeout: seconds("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            db_connect_timeout: seconds("DB_CONNECT_TIMEOUT_SECS", DEFAULT_DB_CONNECT_TIMEOUT_SECS)?,
        })
    }
}
