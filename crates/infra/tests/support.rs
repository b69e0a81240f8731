#![allow(dead_code)]

use std::sync::Arc;

use glucolink_infra::database::{DbManager, SqliteGlucoseStore};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated database in a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("glucolink.sqlite");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn store(&self) -> SqliteGlucoseStore {
        SqliteGlucoseStore::new(Arc::clone(&self.manager))
    }

    /// Number of rows in the `cgm` table.
    pub fn cgm_rows(&self) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row("SELECT COUNT(*) FROM cgm", [], |row| row.get(0))
            .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Successful login envelope.
pub fn login_body(token: &str) -> Value {
    json!({
        "status": 0,
        "data": {
            "user": { "id": "user-1" },
            "authTicket": { "token": token, "expires": 1_700_000_000, "duration": 15_552_000_000_i64 }
        }
    })
}

/// Login envelope redirecting to `region`.
pub fn redirect_body(region: &str) -> Value {
    json!({ "status": 0, "data": { "redirect": true, "region": region } })
}

/// Connections envelope with one connection per patient id.
pub fn connections_body(patient_ids: &[&str], token: &str) -> Value {
    let data: Vec<Value> = patient_ids
        .iter()
        .map(|id| json!({ "id": format!("c-{id}"), "patientId": id, "firstName": "Test" }))
        .collect();
    json!({
        "status": 0,
        "data": data,
        "ticket": { "token": token, "expires": 1_700_000_100, "duration": 15_552_000_000_i64 }
    })
}

/// Graph envelope carrying `samples` as `(factory timestamp, mmol/L)`.
pub fn graph_body(patient_id: &str, samples: &[(&str, f64)], token: &str) -> Value {
    let graph: Vec<Value> = samples
        .iter()
        .map(|(ts, value)| json!({ "FactoryTimestamp": ts, "Timestamp": ts, "Value": value }))
        .collect();
    json!({
        "status": 0,
        "data": {
            "connection": { "patientId": patient_id },
            "activeSensors": [],
            "graphData": graph
        },
        "ticket": { "token": token, "expires": 1_700_000_200, "duration": 15_552_000_000_i64 }
    })
}
