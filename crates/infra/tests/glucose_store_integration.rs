//! Integration tests for the SQLite glucose store

#[path = "support.rs"]
mod support;

use chrono::{TimeZone, Utc};
use glucolink_core::GlucoseStore;
use glucolink_domain::{CgmEntry, Settings};
use support::TestDatabase;

#[tokio::test(flavor = "multi_thread")]
async fn settings_are_stored_as_camel_case_json() {
    let db = TestDatabase::new();
    let store = db.store();

    store.save_settings(&Settings::new("viewer@example.com", "secret", "de")).await.unwrap();

    let conn = db.manager.get_connection().unwrap();
    let raw: String =
        conn.query_row("SELECT value FROM kv WHERE key = 'settings'", [], |row| row.get(0)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value["libreLinkUpUsername"], "viewer@example.com");
    assert_eq!(value["libreLinkUpRegion"], "de");
}

#[tokio::test(flavor = "multi_thread")]
async fn readings_survive_reopening_the_database() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("reopen.sqlite");
    let ts = Utc.with_ymd_and_hms(2023, 8, 2, 6, 51, 0).unwrap();

    {
        let manager = glucolink_infra::DbManager::new(&path, 2).unwrap();
        manager.run_migrations().unwrap();
        let store = glucolink_infra::SqliteGlucoseStore::new(std::sync::Arc::new(manager));
        store.save_cgm(&[CgmEntry::new(ts, 7.1_f32)]).await.unwrap();
    }

    let manager = glucolink_infra::DbManager::new(&path, 2).unwrap();
    manager.run_migrations().unwrap();
    let store = glucolink_infra::SqliteGlucoseStore::new(std::sync::Arc::new(manager));

    let loaded = store.load_cgm_interval(ts, ts).await.unwrap();
    assert_eq!(loaded, vec![CgmEntry::new(ts, 7.1_f32)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_batches_are_all_persisted() {
    let db = TestDatabase::new();
    let store = std::sync::Arc::new(db.store());

    let mut handles = Vec::new();
    for batch in 0..4_i64 {
        let store = std::sync::Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let entries: Vec<CgmEntry> = (0..25_i64)
                .map(|i| {
                    let ts = Utc.timestamp_opt(1_700_000_000 + batch * 10_000 + i * 60, 0).unwrap();
                    CgmEntry::new(ts, 5.0_f32)
                })
                .collect();
            store.save_cgm(&entries).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(db.cgm_rows(), 100);
}
