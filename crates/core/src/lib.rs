//! # Glucolink Core
//!
//! Scraping logic with no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the LibreLinkUp API and the glucose store
//! - Account region discovery and session establishment
//! - The fetch-convert-persist cycle
//!
//! ## Architecture Principles
//! - Only depends on `glucolink-domain`
//! - No database, HTTP, or runtime code
//! - All external dependencies via traits

pub mod linkup;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use linkup::cycle::{
    convert_measurements, fetch_batch, persist_batch, ConvertedBatch, CycleReport, FetchedBatch,
};
pub use linkup::errors::ScrapeError;
pub use linkup::ports::LinkUpApi;
pub use linkup::resolver::AccountResolver;
pub use linkup::session::{establish_session, EstablishedSession};
pub use store::ports::GlucoseStore;
