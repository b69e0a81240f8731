//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `GLUCOLINK_DB_PATH` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Without any file, uses built-in defaults
//!
//! ## Environment Variables
//! - `GLUCOLINK_DB_PATH`: Database file path (required for env loading)
//! - `GLUCOLINK_DB_POOL_SIZE`: Connection pool size
//! - `GLUCOLINK_SCRAPE_INTERVAL`: Seconds between scrape cycles
//! - `GLUCOLINK_REQUEST_TIMEOUT`: LibreLinkUp request timeout in seconds
//! - `GLUCOLINK_LINKUP_ORIGIN`: Send LibreLinkUp requests to this origin
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./glucolink.json` or `./glucolink.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use glucolink_domain::constants::{DB_DIR_NAME, DB_FILE_NAME};
use glucolink_domain::{Config, DatabaseConfig, GlucolinkError, Result, ScraperConfig};

const DB_PATH_ENV: &str = "GLUCOLINK_DB_PATH";

/// Load configuration with automatic fallback strategy
///
/// Environment loading applies whenever `GLUCOLINK_DB_PATH` is set; files and
/// defaults are only consulted when it is not.
///
/// # Errors
/// Returns `GlucolinkError::Config` if an environment variable holds an
/// invalid value or a config file exists but cannot be parsed.
pub fn load() -> Result<Config> {
    if std::env::var_os(DB_PATH_ENV).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!("{DB_PATH_ENV} not set, trying config file");
    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `GLUCOLINK_DB_PATH` must be set; every other variable falls back to its
/// default.
///
/// # Errors
/// Returns `GlucolinkError::Config` if `GLUCOLINK_DB_PATH` is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let path = env_var(DB_PATH_ENV)?;
    let defaults = Config::default();

    let pool_size =
        env_parse("GLUCOLINK_DB_POOL_SIZE", "pool size")?.unwrap_or(defaults.database.pool_size);
    let interval_seconds = env_parse("GLUCOLINK_SCRAPE_INTERVAL", "scrape interval")?
        .unwrap_or(defaults.scraper.interval_seconds);
    let request_timeout_seconds = env_parse("GLUCOLINK_REQUEST_TIMEOUT", "request timeout")?
        .unwrap_or(defaults.scraper.request_timeout_seconds);
    let origin_override =
        std::env::var("GLUCOLINK_LINKUP_ORIGIN").ok().filter(|s| !s.trim().is_empty());

    Ok(Config {
        database: DatabaseConfig { path, pool_size },
        scraper: ScraperConfig {
            interval_seconds,
            request_timeout_seconds,
            origin_override,
            ..defaults.scraper
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `GlucolinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GlucolinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GlucolinkError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GlucolinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GlucolinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GlucolinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GlucolinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 8] = [
        "config.json",
        "config.toml",
        "glucolink.json",
        "glucolink.toml",
        "../config.json",
        "../config.toml",
        "../../config.json",
        "../../config.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Database file location for `config`.
///
/// An empty configured path resolves to `Glucolink/glucolink.sqlite` under
/// the user's data directory.
///
/// # Errors
/// Returns `GlucolinkError::Config` if no path is configured and the
/// platform has no user data directory.
pub fn resolve_db_path(config: &DatabaseConfig) -> Result<PathBuf> {
    if !config.path.trim().is_empty() {
        return Ok(PathBuf::from(&config.path));
    }

    dirs::data_dir().map(|dir| dir.join(DB_DIR_NAME).join(DB_FILE_NAME)).ok_or_else(|| {
        GlucolinkError::Config(
            "no database path configured and no user data directory available".to_string(),
        )
    })
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| GlucolinkError::Config(format!("Missing required environment variable: {key}")))
}

/// Parse an optional numeric environment variable.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GlucolinkError::Config(format!("Invalid {what}: {e}"))),
        Err(_) => Ok(None),
    }
}
