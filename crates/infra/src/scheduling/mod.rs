//! Background scraping
//!
//! - `ScrapeScheduler` owns one polling loop over an established session
//! - `ScraperCoordinator` owns the current scheduler and replaces it on
//!   startup and settings changes
//!
//! Schedulers follow the runtime rules used across the crate:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Structured tracing

pub mod coordinator;
pub mod error;
pub mod scrape_scheduler;

pub use coordinator::ScraperCoordinator;
pub use error::{SchedulerError, SchedulerResult};
pub use scrape_scheduler::{ScrapeScheduler, ScrapeSchedulerConfig};
