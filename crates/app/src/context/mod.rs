//! Application context - dependency injection container

use std::sync::Arc;

use glucolink_core::{GlucoseStore, LinkUpApi};
use glucolink_domain::{Config, Result, Settings};
use glucolink_infra::config;
use glucolink_infra::scheduling::ScrapeSchedulerConfig;
use glucolink_infra::{DbManager, LinkUpClient, ScraperCoordinator, SqliteGlucoseStore};
use tracing::{info, warn};

/// Environment variables that seed LibreLinkUp settings at startup.
pub const USERNAME_ENV: &str = "GLUCOLINK_LINKUP_USERNAME";
pub const PASSWORD_ENV: &str = "GLUCOLINK_LINKUP_PASSWORD";
pub const REGION_ENV: &str = "GLUCOLINK_LINKUP_REGION";

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub store: Arc<dyn GlucoseStore>,
    pub coordinator: Arc<ScraperCoordinator>,
}

impl AppContext {
    /// Create the context from the loaded configuration.
    ///
    /// # Errors
    /// Returns an error if configuration loading or store setup fails.
    pub fn new() -> Result<Self> {
        Self::new_with_config(config::load()?)
    }

    /// Create the context with an explicit configuration.
    ///
    /// Opens (and migrates) the store and builds the LibreLinkUp client. No
    /// network traffic happens until [`AppContext::start`].
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated, or the
    /// configured LibreLinkUp origin is not a valid URL.
    pub fn new_with_config(config: Config) -> Result<Self> {
        let db_path = config::resolve_db_path(&config.database)?;
        let db = Arc::new(DbManager::new(&db_path, config.database.pool_size)?);
        db.run_migrations()?;

        let store: Arc<dyn GlucoseStore> = Arc::new(SqliteGlucoseStore::new(Arc::clone(&db)));
        let api: Arc<dyn LinkUpApi> = Arc::new(LinkUpClient::from_config(&config.scraper)?);
        let coordinator = Arc::new(ScraperCoordinator::new(
            api,
            Arc::clone(&store),
            ScrapeSchedulerConfig::from(&config.scraper),
        ));

        info!(
            db_path = %db_path.display(),
            interval_secs = config.scraper.interval().as_secs(),
            "application context initialized"
        );

        Ok(Self { config, db, store, coordinator })
    }

    /// Run the startup event.
    ///
    /// Settings present in the environment are saved first and treated as a
    /// settings change. Scraper failures are logged by the coordinator and
    /// leave the process idle.
    pub async fn start(&self) {
        self.start_with(settings_from_env()).await;
    }

    /// [`AppContext::start`] with explicitly provided seed settings.
    pub async fn start_with(&self, seed: Option<Settings>) {
        let outcome = match seed {
            Some(settings) => match self.store.save_settings(&settings).await {
                Ok(()) => {
                    info!(region = %settings.libre_link_up_region, "seeded settings from environment");
                    self.coordinator.on_settings_saved().await
                }
                Err(err) => {
                    warn!(error = %err, "failed to save seeded settings");
                    self.coordinator.on_startup().await
                }
            },
            None => self.coordinator.on_startup().await,
        };

        if let Err(err) = outcome {
            warn!(reason = err.kind(), "scraper idle: {}", err.user_message());
        }
    }

    /// Stop the scraper and wait for its loop to exit.
    pub async fn shutdown(&self) {
        info!("shutdown called on AppContext");
        self.coordinator.shutdown().await;
    }

    /// Whether the database answers a trivial query.
    pub fn health_check(&self) -> bool {
        self.db.health_check().is_ok()
    }
}

/// Settings from [`USERNAME_ENV`], [`PASSWORD_ENV`] and [`REGION_ENV`].
pub fn settings_from_env() -> Option<Settings> {
    settings_from_lookup(|key| std::env::var(key).ok())
}

/// Build settings when all three keys resolve to non-blank values.
pub fn settings_from_lookup<F>(lookup: F) -> Option<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = Settings::new(lookup(USERNAME_ENV)?, lookup(PASSWORD_ENV)?, lookup(REGION_ENV)?);
    settings.is_valid().then_some(settings)
}
