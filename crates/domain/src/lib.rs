//! # Glucolink Domain
//!
//! Business domain types and models for Glucolink.
//!
//! This crate contains:
//! - Settings and CGM entry types
//! - The LibreLinkUp wire model and regional endpoint catalog
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other Glucolink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::linkup_time::parse_linkup_timestamp;
