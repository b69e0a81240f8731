//! Application configuration structures
//!
//! Deserialized from environment variables or JSON/TOML files by the
//! infrastructure config loader. Every section has defaults so partial files
//! are accepted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DB_POOL_SIZE, DEFAULT_JOIN_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SCRAPE_INTERVAL_SECS,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
}

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path. Empty means "use the platform data directory".
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: String::new(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Polling scraper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Seconds between two scrape cycles.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Upper bound for a single LibreLinkUp request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// How long `stop()` waits for the loop before aborting it.
    #[serde(default = "default_join_timeout")]
    pub join_timeout_seconds: u64,
    /// Send every LibreLinkUp request to this origin instead of the regional
    /// host (reverse proxies, local mocks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_override: Option<String>,
}

impl ScraperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_seconds.max(1))
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: DEFAULT_SCRAPE_INTERVAL_SECS,
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            join_timeout_seconds: DEFAULT_JOIN_TIMEOUT_SECS,
            origin_override: None,
        }
    }
}

fn default_pool_size() -> u32 {
    DEFAULT_DB_POOL_SIZE
}

fn default_interval() -> u64 {
    DEFAULT_SCRAPE_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_join_timeout() -> u64 {
    DEFAULT_JOIN_TIMEOUT_SECS
}
