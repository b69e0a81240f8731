//! Periodic LibreLinkUp scraper.
//!
//! A scheduler is built from saved settings: building it logs in, corrects
//! the account region if needed and pins the single linked patient. Once
//! started it runs one scrape cycle immediately and then one per interval
//! until stopped. Cycle failures are logged and never end the loop.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use glucolink_domain::{ScraperConfig, Settings};
//! use glucolink_infra::database::{DbManager, SqliteGlucoseStore};
//! use glucolink_infra::integrations::linkup::LinkUpClient;
//! use glucolink_infra::scheduling::{ScrapeScheduler, ScrapeSchedulerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScraperConfig::default();
//! let db = Arc::new(DbManager::new("glucolink.sqlite", 4)?);
//! db.run_migrations()?;
//! let store = Arc::new(SqliteGlucoseStore::new(db));
//! let api = Arc::new(LinkUpClient::from_config(&config)?);
//!
//! let settings = Settings::new("viewer@example.com", "secret", "eu");
//! let mut scheduler =
//!     ScrapeScheduler::build(api, store, settings, ScrapeSchedulerConfig::from(&config)).await?;
//!
//! scheduler.start()?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use glucolink_core::{
    establish_session, fetch_batch, persist_batch, CycleReport, GlucoseStore, LinkUpApi,
    ScrapeError,
};
use glucolink_domain::{GlucolinkError, SchedulerState, ScraperConfig, Session, Settings};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Timing for a scrape scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSchedulerConfig {
    /// Time between the start of two cycles
    pub interval: Duration,
    /// How long `stop()` waits for the loop before aborting it
    pub join_timeout: Duration,
}

impl Default for ScrapeSchedulerConfig {
    fn default() -> Self {
        Self::from(&ScraperConfig::default())
    }
}

impl From<&ScraperConfig> for ScrapeSchedulerConfig {
    fn from(config: &ScraperConfig) -> Self {
        Self { interval: config.interval(), join_timeout: config.join_timeout() }
    }
}

/// Everything the background loop needs
struct LoopContext {
    api: Arc<dyn LinkUpApi>,
    store: Arc<dyn GlucoseStore>,
    session: Arc<Mutex<Session>>,
    patient_id: String,
    write_gate: Arc<Mutex<()>>,
}

/// Owns one polling loop for one patient.
pub struct ScrapeScheduler {
    api: Arc<dyn LinkUpApi>,
    store: Arc<dyn GlucoseStore>,
    session: Arc<Mutex<Session>>,
    patient_id: String,
    /// Held by a store write until it completes, even if the loop is aborted.
    write_gate: Arc<Mutex<()>>,
    settings: Settings,
    config: ScrapeSchedulerConfig,
    state: SchedulerState,
    cancellation_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl ScrapeScheduler {
    /// Establish a LibreLinkUp session for `settings` and return an idle
    /// scheduler bound to it.
    ///
    /// # Errors
    ///
    /// Returns the construction failure; no scheduler exists afterwards.
    #[instrument(skip_all, fields(username = %settings.libre_link_up_username))]
    pub async fn build(
        api: Arc<dyn LinkUpApi>,
        store: Arc<dyn GlucoseStore>,
        settings: Settings,
        config: ScrapeSchedulerConfig,
    ) -> Result<Self, ScrapeError> {
        let established = establish_session(Arc::clone(&api), store.as_ref(), settings).await?;

        Ok(Self {
            api,
            store,
            session: Arc::new(Mutex::new(established.session)),
            patient_id: established.patient_id,
            write_gate: Arc::new(Mutex::new(())),
            settings: established.settings,
            config,
            state: SchedulerState::Idle,
            cancellation_token: CancellationToken::new(),
            task_handle: None,
        })
    }

    /// Start the scheduler
    ///
    /// Spawns the background loop and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self), fields(patient_id = %self.patient_id))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if !self.state.can_start() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(interval_secs = self.config.interval.as_secs(), "Starting scrape scheduler");

        // Fresh token so a stopped scheduler can be restarted
        self.cancellation_token = CancellationToken::new();

        let context = LoopContext {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            session: Arc::clone(&self.session),
            patient_id: self.patient_id.clone(),
            write_gate: Arc::clone(&self.write_gate),
        };
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        self.task_handle = Some(tokio::spawn(async move {
            Self::scrape_loop(context, interval, cancel).await;
        }));
        self.state = SchedulerState::Running;

        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the loop and waits for it to exit. A cycle in flight is
    /// allowed to finish; if the loop outlives the join timeout it is aborted
    /// and awaited. A store write already under way always runs to
    /// completion first, so no write lands after this returns.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running, or if the task panicked.
    #[instrument(skip(self), fields(patient_id = %self.patient_id))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.state.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping scrape scheduler");
        self.state = SchedulerState::Stopping;
        self.cancellation_token.cancel();

        let joined = match self.task_handle.take() {
            Some(handle) => Self::join(handle, self.config.join_timeout).await,
            None => Ok(()),
        };

        let _drained = self.write_gate.lock().await;

        self.state = SchedulerState::Stopped;
        info!("Scrape scheduler stopped");
        joined
    }

    async fn join(mut handle: JoinHandle<()>, join_timeout: Duration) -> SchedulerResult<()> {
        let result = match tokio::time::timeout(join_timeout, &mut handle).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_ms = join_timeout.as_millis(),
                    "Scrape loop did not exit in time; aborting"
                );
                handle.abort();
                handle.await
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(err) if err.is_cancelled() => Ok(()),
            Err(err) => Err(SchedulerError::TaskJoinFailed(err.to_string())),
        }
    }

    /// True only between a successful `start()` and the next `stop()`.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Patient pinned at construction.
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Settings the session was established with, including a corrected
    /// region.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Background scrape loop
    ///
    /// Cancellation is only observed between cycles.
    async fn scrape_loop(context: LoopContext, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            Self::run_cycle(&context).await;

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Scrape loop cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }
        }
    }

    async fn run_cycle(context: &LoopContext) {
        match Self::cycle(context).await {
            Ok(report) => info!(
                patient_id = %context.patient_id,
                fetched = report.fetched,
                stored = report.stored,
                dropped = report.dropped,
                "Scrape cycle completed"
            ),
            Err(err) if err.is_transient() => warn!(
                patient_id = %context.patient_id,
                error = %err,
                "Scrape cycle failed; retrying next interval"
            ),
            Err(err) => error!(
                patient_id = %context.patient_id,
                kind = err.kind(),
                error = %err,
                "Scrape cycle failed"
            ),
        }
    }

    /// Fetch under the session lock, then persist in a separate task.
    ///
    /// The write task owns the write gate until `save_cgm` has returned, so
    /// aborting the loop cannot leave a store write running unobserved.
    async fn cycle(context: &LoopContext) -> Result<CycleReport, ScrapeError> {
        let batch = {
            let mut session = context.session.lock().await;
            fetch_batch(context.api.as_ref(), &mut session, &context.patient_id).await?
        };

        let gate = Arc::clone(&context.write_gate).lock_owned().await;
        let store = Arc::clone(&context.store);
        let write = tokio::spawn(async move {
            let report = persist_batch(store.as_ref(), &batch).await;
            drop(gate);
            report
        });

        write.await.map_err(|err| {
            ScrapeError::Store(GlucolinkError::Internal(format!("store write task failed: {err}")))
        })?
    }
}

/// Ensure the loop is cancelled when the scheduler is dropped
impl Drop for ScrapeScheduler {
    fn drop(&mut self) {
        if self.state.is_running() && !self.cancellation_token.is_cancelled() {
            warn!(patient_id = %self.patient_id, "ScrapeScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
