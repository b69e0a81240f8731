//! Port interface for the LibreLinkUp session client

use async_trait::async_trait;
use glucolink_domain::{Connection, Endpoint, GraphData, Session};

use super::errors::ScrapeError;

/// Remote LibreLinkUp operations.
///
/// Each call issues exactly one request and never retries. Calls taking a
/// `&mut Session` renew its ticket from the response on success.
#[async_trait]
pub trait LinkUpApi: Send + Sync {
    /// Authenticate against `endpoint`.
    ///
    /// Fails with [`ScrapeError::WrongRegion`] when the account lives in a
    /// different region and with [`ScrapeError::InvalidCredentials`] when the
    /// username/password pair is rejected.
    async fn login(
        &self,
        username: &str,
        password: &str,
        endpoint: Endpoint,
    ) -> Result<Session, ScrapeError>;

    /// Patients linked to the authenticated account.
    async fn list_connections(&self, session: &mut Session)
        -> Result<Vec<Connection>, ScrapeError>;

    /// Latest graph (connection, sensors, samples) for a patient.
    async fn fetch_graph(
        &self,
        session: &mut Session,
        patient_id: &str,
    ) -> Result<GraphData, ScrapeError>;
}
