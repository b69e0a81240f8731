//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// LibreLinkUp client identity
pub const LINKUP_VERSION: &str = "4.7.0";
pub const LINKUP_PRODUCT: &str = "llu.ios";
pub const LINKUP_USER_AGENT: &str = "LibreLink";

/// Envelope status reported for a rejected username/password pair.
pub const LINKUP_STATUS_BAD_CREDENTIALS: i32 = 2;

/// Vendor timestamp layout, e.g. `6/20/2023 10:01:57 PM`.
pub const LINKUP_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

// Scraper defaults
pub const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_JOIN_TIMEOUT_SECS: u64 = 45;

// Storage defaults
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
pub const DB_DIR_NAME: &str = "Glucolink";
pub const DB_FILE_NAME: &str = "glucolink.sqlite";
pub const SETTINGS_KEY: &str = "settings";
