//! In-memory port implementations for tests
//!
//! `ScriptedLinkUpApi` replays queued responses and records every call;
//! `MemoryStore` keeps settings and readings in memory with write counters.
//! Enabled for dependents through the `test-utils` feature.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glucolink_domain::{
    AuthTicket, CgmEntry, Connection, Endpoint, GlucolinkError, GraphData, Result as DomainResult,
    Session, Settings,
};

use crate::linkup::errors::ScrapeError;
use crate::linkup::ports::LinkUpApi;
use crate::store::ports::GlucoseStore;

type Scripted<T> = Mutex<VecDeque<Result<T, ScrapeError>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `LinkUpApi` that answers from per-operation queues.
///
/// An exhausted login or connection queue answers with a transport error.
/// An exhausted graph queue answers with the fallback graph, so scheduler
/// tests can run any number of cycles.
#[derive(Default)]
pub struct ScriptedLinkUpApi {
    logins: Scripted<Session>,
    connections: Scripted<Vec<Connection>>,
    graphs: Scripted<GraphData>,
    fallback_graph: Mutex<GraphData>,
    login_endpoints: Mutex<Vec<Endpoint>>,
    graph_patients: Mutex<Vec<String>>,
    connection_calls: AtomicUsize,
    renewals: AtomicUsize,
}

impl ScriptedLinkUpApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session bound to `endpoint` with a fixed token.
    pub fn session(endpoint: Endpoint) -> Session {
        Session::new(
            AuthTicket { token: "token-0".to_string(), expires: 1_700_000_000, duration: 86_400_000 },
            endpoint,
        )
    }

    /// A connection for `patient_id` with no latest measurement.
    pub fn connection(patient_id: &str) -> Connection {
        Connection {
            id: format!("connection-{patient_id}"),
            patient_id: patient_id.to_string(),
            ..Connection::default()
        }
    }

    pub fn push_login(&self, result: Result<Session, ScrapeError>) {
        lock(&self.logins).push_back(result);
    }

    pub fn push_connections(&self, result: Result<Vec<Connection>, ScrapeError>) {
        lock(&self.connections).push_back(result);
    }

    pub fn push_graph(&self, result: Result<GraphData, ScrapeError>) {
        lock(&self.graphs).push_back(result);
    }

    pub fn set_fallback_graph(&self, graph: GraphData) {
        *lock(&self.fallback_graph) = graph;
    }

    /// Endpoints passed to `login`, in call order.
    pub fn login_endpoints(&self) -> Vec<Endpoint> {
        lock(&self.login_endpoints).clone()
    }

    pub fn login_calls(&self) -> usize {
        lock(&self.login_endpoints).len()
    }

    pub fn connection_calls(&self) -> usize {
        self.connection_calls.load(Ordering::SeqCst)
    }

    /// Patient ids passed to `fetch_graph`, in call order.
    pub fn graph_patients(&self) -> Vec<String> {
        lock(&self.graph_patients).clone()
    }

    pub fn graph_calls(&self) -> usize {
        lock(&self.graph_patients).len()
    }

    fn renew(&self, session: &mut Session) {
        let n = self.renewals.fetch_add(1, Ordering::SeqCst) + 1;
        let mut ticket = session.ticket().clone();
        ticket.token = format!("token-{n}");
        session.renew(ticket);
    }
}

fn exhausted(operation: &str) -> ScrapeError {
    ScrapeError::Transport(format!("no scripted {operation} response"))
}

#[async_trait]
impl LinkUpApi for ScriptedLinkUpApi {
    async fn login(
        &self,
        _username: &str,
        _password: &str,
        endpoint: Endpoint,
    ) -> Result<Session, ScrapeError> {
        lock(&self.login_endpoints).push(endpoint);
        lock(&self.logins).pop_front().unwrap_or_else(|| Err(exhausted("login")))
    }

    async fn list_connections(
        &self,
        session: &mut Session,
    ) -> Result<Vec<Connection>, ScrapeError> {
        self.connection_calls.fetch_add(1, Ordering::SeqCst);
        let result =
            lock(&self.connections).pop_front().unwrap_or_else(|| Err(exhausted("connections")));
        if result.is_ok() {
            self.renew(session);
        }
        result
    }

    async fn fetch_graph(
        &self,
        session: &mut Session,
        patient_id: &str,
    ) -> Result<GraphData, ScrapeError> {
        lock(&self.graph_patients).push(patient_id.to_string());
        let next = lock(&self.graphs).pop_front();
        let result = next.unwrap_or_else(|| Ok(lock(&self.fallback_graph).clone()));
        if result.is_ok() {
            self.renew(session);
        }
        result
    }
}

#[derive(Default)]
struct StoreState {
    settings: Option<Settings>,
    entries: BTreeMap<DateTime<Utc>, CgmEntry>,
}

/// `GlucoseStore` backed by a map keyed on timestamp.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    cgm_saves: AtomicUsize,
    settings_saves: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        let store = Self::default();
        lock(&store.state).settings = Some(settings);
        store
    }

    /// Make every subsequent write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn stored_settings(&self) -> Option<Settings> {
        lock(&self.state).settings.clone()
    }

    /// Stored readings, oldest first.
    pub fn entries(&self) -> Vec<CgmEntry> {
        lock(&self.state).entries.values().copied().collect()
    }

    /// Number of `save_cgm` calls, failed ones included.
    pub fn cgm_saves(&self) -> usize {
        self.cgm_saves.load(Ordering::SeqCst)
    }

    pub fn settings_saves(&self) -> usize {
        self.settings_saves.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GlucolinkError::Database("store is read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl GlucoseStore for MemoryStore {
    async fn get_settings(&self) -> DomainResult<Settings> {
        lock(&self.state)
            .settings
            .clone()
            .ok_or_else(|| GlucolinkError::NotFound("settings".to_string()))
    }

    async fn save_settings(&self, settings: &Settings) -> DomainResult<()> {
        self.settings_saves.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        lock(&self.state).settings = Some(settings.clone());
        Ok(())
    }

    async fn save_cgm(&self, entries: &[CgmEntry]) -> DomainResult<()> {
        self.cgm_saves.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let mut state = lock(&self.state);
        for entry in entries {
            state.entries.insert(entry.timestamp, *entry);
        }
        Ok(())
    }

    async fn load_cgm_interval(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<CgmEntry>> {
        Ok(lock(&self.state).entries.range(from..=to).map(|(_, entry)| *entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use glucolink_domain::DEFAULT_ENDPOINT;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn successful_calls_renew_the_ticket() {
        let api = ScriptedLinkUpApi::new();
        api.push_connections(Ok(vec![ScriptedLinkUpApi::connection("p")]));
        let mut session = ScriptedLinkUpApi::session(DEFAULT_ENDPOINT);

        api.list_connections(&mut session).await.unwrap();
        assert_eq!(session.token(), "token-1");

        api.fetch_graph(&mut session, "p").await.unwrap();
        assert_eq!(session.token(), "token-2");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn memory_store_replaces_duplicate_timestamps() {
        let store = MemoryStore::new();
        let ts = Utc.with_ymd_and_hms(2023, 6, 20, 22, 1, 57).unwrap();

        store.save_cgm(&[CgmEntry::new(ts, 5.0_f32)]).await.unwrap();
        store.save_cgm(&[CgmEntry::new(ts, 6.0_f32)]).await.unwrap();

        let loaded = store.load_cgm_interval(ts, ts).await.unwrap();
        assert_eq!(loaded, vec![CgmEntry::new(ts, 6.0_f32)]);
        assert_eq!(store.cgm_saves(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_settings_are_not_found() {
        let store = MemoryStore::new();
        let err = store.get_settings().await.unwrap_err();
        assert!(err.is_not_found());
    }
}
