//! Glucolink - LibreLinkUp CGM scraper
//!
//! Main entry point: scrape until Ctrl-C.

use anyhow::Context;
use glucolink_lib::utils::logging;
use glucolink_lib::AppContext;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber reads GLUCOLINK_LOG
    let dotenv = dotenvy::dotenv();
    logging::init();

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    let context = AppContext::new().context("failed to initialize application context")?;
    info!(db_path = %context.db.path().display(), "Glucolink starting");

    context.start().await;

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("Shutdown requested");

    context.shutdown().await;
    Ok(())
}
