//! Lifecycle coordinator for the scrape scheduler.
//!
//! The coordinator is the only owner of the current scheduler. Events are
//! serialized: a settings change stops the running scheduler, waits for its
//! loop to exit, then builds and starts a replacement from the stored
//! settings.

use std::sync::Arc;

use glucolink_core::{GlucoseStore, LinkUpApi, ScrapeError};
use glucolink_domain::SchedulerState;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use super::scrape_scheduler::{ScrapeScheduler, ScrapeSchedulerConfig};

/// Reacts to application events by (re)building the scrape scheduler.
pub struct ScraperCoordinator {
    api: Arc<dyn LinkUpApi>,
    store: Arc<dyn GlucoseStore>,
    config: ScrapeSchedulerConfig,
    current: Mutex<Option<ScrapeScheduler>>,
}

impl ScraperCoordinator {
    /// Coordinator with no scheduler; nothing runs until an event arrives.
    pub fn new(
        api: Arc<dyn LinkUpApi>,
        store: Arc<dyn GlucoseStore>,
        config: ScrapeSchedulerConfig,
    ) -> Self {
        Self { api, store, config, current: Mutex::new(None) }
    }

    /// Application started: scrape with the persisted settings.
    ///
    /// # Errors
    ///
    /// Returns the construction failure after logging it; no scheduler is
    /// left running.
    #[instrument(skip(self))]
    pub async fn on_startup(&self) -> Result<(), ScrapeError> {
        let mut current = self.current.lock().await;
        self.replace(&mut current).await
    }

    /// Settings were saved: replace the scheduler with one built from the
    /// new settings. The old loop has fully exited before the new session is
    /// established.
    ///
    /// # Errors
    ///
    /// Returns the construction failure after logging it; the old scheduler
    /// is stopped regardless.
    #[instrument(skip(self))]
    pub async fn on_settings_saved(&self) -> Result<(), ScrapeError> {
        let mut current = self.current.lock().await;
        self.replace(&mut current).await
    }

    /// Stop and drop the current scheduler, if any.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let mut current = self.current.lock().await;
        Self::retire(&mut current).await;
    }

    /// Whether a current scheduler exists and is running.
    pub async fn is_running(&self) -> bool {
        self.current.lock().await.as_ref().is_some_and(ScrapeScheduler::is_running)
    }

    /// State of the current scheduler, `None` when there is none.
    pub async fn state(&self) -> Option<SchedulerState> {
        self.current.lock().await.as_ref().map(ScrapeScheduler::state)
    }

    /// Patient scraped by the current scheduler.
    pub async fn patient_id(&self) -> Option<String> {
        self.current.lock().await.as_ref().map(|s| s.patient_id().to_string())
    }

    async fn replace(&self, current: &mut Option<ScrapeScheduler>) -> Result<(), ScrapeError> {
        Self::retire(current).await;

        let settings = match self.store.get_settings().await {
            Ok(settings) => settings,
            Err(err) if err.is_not_found() => {
                info!("No LibreLinkUp settings saved; scraper not started");
                return Err(ScrapeError::Store(err));
            }
            Err(err) => {
                error!(error = %err, "Failed to load LibreLinkUp settings");
                return Err(ScrapeError::Store(err));
            }
        };

        let mut scheduler = match ScrapeScheduler::build(
            Arc::clone(&self.api),
            Arc::clone(&self.store),
            settings,
            self.config,
        )
        .await
        {
            Ok(scheduler) => scheduler,
            Err(err) => {
                error!(
                    kind = err.kind(),
                    error = %err,
                    hint = %err.user_message(),
                    "Could not start LibreLinkUp scraper"
                );
                return Err(err);
            }
        };

        if let Err(err) = scheduler.start() {
            warn!(error = %err, "Fresh scheduler refused to start");
        }
        *current = Some(scheduler);
        Ok(())
    }

    async fn retire(current: &mut Option<ScrapeScheduler>) {
        let Some(mut scheduler) = current.take() else {
            return;
        };
        if !scheduler.is_running() {
            return;
        }
        if let Err(err) = scheduler.stop().await {
            warn!(error = %err, "Scrape scheduler did not stop cleanly");
        }
    }
}
