//! SQLite-backed glucose store.
//!
//! Implements the `GlucoseStore` port. Settings are kept as JSON in the `kv`
//! table; readings in `cgm` keyed by unix second. All database operations run
//! in `spawn_blocking` to avoid blocking the async runtime.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use glucolink_core::GlucoseStore;
use glucolink_domain::constants::SETTINGS_KEY;
use glucolink_domain::{CgmEntry, GlucolinkError, Mmoll, Result as DomainResult, Settings};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;
use tracing::debug;

use super::manager::{map_sql_error, DbManager};

/// SQLite implementation of [`GlucoseStore`].
pub struct SqliteGlucoseStore {
    db: Arc<DbManager>,
}

impl SqliteGlucoseStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn with_connection<T, F>(&self, op: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> DomainResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<T> {
            let mut conn = db.get_connection()?;
            op(&mut *conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl GlucoseStore for SqliteGlucoseStore {
    async fn get_settings(&self) -> DomainResult<Settings> {
        let raw = self.with_connection(|conn| query_kv(conn, SETTINGS_KEY)).await?;
        match raw {
            Some(json) => Settings::from_json(&json),
            None => Err(GlucolinkError::NotFound("settings".into())),
        }
    }

    async fn save_settings(&self, settings: &Settings) -> DomainResult<()> {
        let json = settings.to_json()?;
        self.with_connection(move |conn| upsert_kv(conn, SETTINGS_KEY, &json)).await
    }

    async fn save_cgm(&self, entries: &[CgmEntry]) -> DomainResult<()> {
        let entries = entries.to_vec();
        let count = entries.len();
        self.with_connection(move |conn| insert_cgm(conn, &entries)).await?;
        debug!(count, "stored cgm batch");
        Ok(())
    }

    async fn load_cgm_interval(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<CgmEntry>> {
        self.with_connection(move |conn| query_cgm_range(conn, from.timestamp(), to.timestamp()))
            .await
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn query_kv(conn: &Connection, key: &str) -> DomainResult<Option<String>> {
    conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
        row.get::<_, Option<String>>(0)
    })
    .optional()
    .map(Option::flatten)
    .map_err(map_sql_error)
}

fn upsert_kv(conn: &Connection, key: &str, value: &str) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

/// Write the whole batch in one transaction. A reading whose timestamp is
/// already stored replaces the old value.
fn insert_cgm(conn: &mut Connection, entries: &[CgmEntry]) -> DomainResult<()> {
    let tx = conn.transaction().map_err(map_sql_error)?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO cgm (ts, mmoll) VALUES (?1, ?2)
                 ON CONFLICT(ts) DO UPDATE SET mmoll = excluded.mmoll",
            )
            .map_err(map_sql_error)?;
        for entry in entries {
            stmt.execute(params![entry.timestamp.timestamp(), f64::from(entry.mmoll.0)])
                .map_err(map_sql_error)?;
        }
    }
    tx.commit().map_err(map_sql_error)
}

fn query_cgm_range(conn: &Connection, from: i64, to: i64) -> DomainResult<Vec<CgmEntry>> {
    let mut stmt = conn
        .prepare("SELECT ts, mmoll FROM cgm WHERE ts >= ?1 AND ts <= ?2 ORDER BY ts")
        .map_err(map_sql_error)?;

    let rows = stmt
        .query_map(params![from, to], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)))
        .map_err(map_sql_error)?;

    let mut entries = Vec::new();
    for row in rows {
        let (ts, mmoll) = row.map_err(map_sql_error)?;
        let timestamp = Utc.timestamp_opt(ts, 0).single().ok_or_else(|| {
            GlucolinkError::Database(format!("stored timestamp {ts} is out of range"))
        })?;
        entries.push(CgmEntry::new(timestamp, Mmoll::from(mmoll)));
    }
    Ok(entries)
}

fn map_join_error(err: task::JoinError) -> GlucolinkError {
    if err.is_cancelled() {
        GlucolinkError::Internal("blocking task cancelled".into())
    } else {
        GlucolinkError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store() -> (SqliteGlucoseStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = DbManager::new(temp_dir.path().join("store.db"), 2).unwrap();
        manager.run_migrations().unwrap();
        (SqliteGlucoseStore::new(Arc::new(manager)), temp_dir)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn settings_round_trip() {
        let (store, _dir) = store();
        let settings = Settings::new("viewer@example.com", "secret", "eu");

        store.save_settings(&settings).await.unwrap();
        assert_eq!(store.get_settings().await.unwrap(), settings);

        let corrected = Settings::new("viewer@example.com", "secret", "us");
        store.save_settings(&corrected).await.unwrap();
        assert_eq!(store.get_settings().await.unwrap(), corrected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_settings_are_not_found() {
        let (store, _dir) = store();
        assert!(store.get_settings().await.unwrap_err().is_not_found());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn duplicate_timestamps_keep_latest_value() {
        let (store, _dir) = store();

        store.save_cgm(&[CgmEntry::new(at(100), 5.0_f32)]).await.unwrap();
        store
            .save_cgm(&[CgmEntry::new(at(100), 6.5_f32), CgmEntry::new(at(200), 7.0_f32)])
            .await
            .unwrap();

        let loaded = store.load_cgm_interval(at(0), at(1_000)).await.unwrap();
        assert_eq!(
            loaded,
            vec![CgmEntry::new(at(100), 6.5_f32), CgmEntry::new(at(200), 7.0_f32)]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn interval_is_inclusive_and_ordered() {
        let (store, _dir) = store();
        store
            .save_cgm(&[
                CgmEntry::new(at(300), 6.0_f32),
                CgmEntry::new(at(100), 4.0_f32),
                CgmEntry::new(at(200), 5.0_f32),
                CgmEntry::new(at(400), 7.0_f32),
            ])
            .await
            .unwrap();

        let loaded = store.load_cgm_interval(at(100), at(300)).await.unwrap();
        let stamps: Vec<i64> = loaded.iter().map(|e| e.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![100, 200, 300]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_batch_is_accepted() {
        let (store, _dir) = store();
        store.save_cgm(&[]).await.unwrap();
        assert!(store.load_cgm_interval(at(0), at(i64::from(u32::MAX))).await.unwrap().is_empty());
    }
}
