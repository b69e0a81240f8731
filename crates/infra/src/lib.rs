//! # Glucolink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The SQLite glucose store (r2d2 pool, schema migrations)
//! - The HTTP transport and the LibreLinkUp session client
//! - Configuration loading
//! - The scrape scheduler and its lifecycle coordinator
//!
//! ## Architecture
//! - Implements traits defined in `glucolink-core`
//! - Contains all "impure" code (I/O, timers, background tasks)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteGlucoseStore};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::linkup::LinkUpClient;
pub use scheduling::{ScrapeScheduler, ScraperCoordinator, SchedulerError, SchedulerResult};
