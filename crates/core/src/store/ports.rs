//! Port interface for settings and CGM persistence
//!
//! The scraper only sees storage through this trait. Implementations must
//! serialize their own writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glucolink_domain::{CgmEntry, Result, Settings};

/// Settings and glucose reading persistence
#[async_trait]
pub trait GlucoseStore: Send + Sync {
    /// Load the LibreLinkUp settings. Fails with `NotFound` when none were
    /// ever saved.
    async fn get_settings(&self) -> Result<Settings>;

    /// Replace the stored settings.
    async fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Persist a batch of readings in one write. A timestamp that already
    /// exists has its value replaced.
    async fn save_cgm(&self, entries: &[CgmEntry]) -> Result<()>;

    /// Readings with `from <= timestamp <= to`, oldest first.
    async fn load_cgm_interval(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CgmEntry>>;
}
