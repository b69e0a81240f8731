//! Session establishment for a scraper instance
//!
//! Runs once per scheduler: validate settings, log in at the configured
//! region (correcting it once if the account lives elsewhere) and pin the
//! single linked patient.

use std::sync::Arc;

use glucolink_domain::{endpoint_by_region, Session, Settings};
use tracing::{info, warn};

use super::errors::ScrapeError;
use super::ports::LinkUpApi;
use super::resolver::AccountResolver;
use crate::store::ports::GlucoseStore;

/// Everything a scheduler needs to run its cycles.
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub session: Session,
    pub patient_id: String,
    /// Settings in effect, including a region corrected during login.
    pub settings: Settings,
}

/// Authenticate and resolve the patient for `settings`.
///
/// On a wrong-region answer the account's region is discovered once, the
/// corrected settings are persisted and login is retried once. Any failure
/// of the retry is final.
pub async fn establish_session(
    api: Arc<dyn LinkUpApi>,
    store: &dyn GlucoseStore,
    mut settings: Settings,
) -> Result<EstablishedSession, ScrapeError> {
    if !settings.is_valid() {
        return Err(ScrapeError::InvalidSettings(
            "username, password and region must be non-empty".to_string(),
        ));
    }

    let region = settings.libre_link_up_region.trim().to_string();
    let endpoint = endpoint_by_region(&region)
        .ok_or_else(|| ScrapeError::UnknownRegion { region: region.clone() })?;

    let username = settings.libre_link_up_username.clone();
    let password = settings.libre_link_up_password.clone();

    let mut session = match api.login(&username, &password, endpoint).await {
        Ok(session) => session,
        Err(ScrapeError::WrongRegion { region: hinted }) => {
            warn!(
                username = %username,
                region = %region,
                hinted = %hinted,
                "LibreLinkUp account is in another region, discovering"
            );
            let resolver = AccountResolver::new(Arc::clone(&api));
            let discovered = resolver.discover_endpoint(&username, &password).await?;

            settings.libre_link_up_region = discovered.region.to_string();
            store.save_settings(&settings).await?;
            info!(region = %discovered.region, "saved corrected LibreLinkUp region");

            api.login(&username, &password, discovered).await?
        }
        Err(err) => return Err(err),
    };

    let connections = api.list_connections(&mut session).await?;
    if connections.len() != 1 {
        return Err(ScrapeError::UnexpectedConnectionCount { count: connections.len() });
    }
    let patient_id = connections
        .into_iter()
        .next()
        .map(|connection| connection.patient_id)
        .ok_or(ScrapeError::UnexpectedConnectionCount { count: 0 })?;

    info!(
        username = %username,
        endpoint = %session.endpoint(),
        patient_id = %patient_id,
        "LibreLinkUp session established"
    );

    Ok(EstablishedSession { session, patient_id, settings })
}

#[cfg(test)]
mod tests {
    use glucolink_domain::{endpoint_by_region, GlucolinkError, DEFAULT_ENDPOINT};

    use super::*;
    use crate::testing::{MemoryStore, ScriptedLinkUpApi};

    fn settings(region: &str) -> Settings {
        Settings::new("viewer@example.com", "secret", region)
    }

    fn endpoint(region: &str) -> glucolink_domain::Endpoint {
        endpoint_by_region(region).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn yields_single_patient() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Ok(ScriptedLinkUpApi::session(endpoint("de"))));
        api.push_connections(Ok(vec![ScriptedLinkUpApi::connection("patient-1")]));
        let store = MemoryStore::new();

        let established = establish_session(api.clone(), &store, settings("de")).await.unwrap();

        assert_eq!(established.patient_id, "patient-1");
        assert_eq!(established.session.endpoint(), endpoint("de"));
        assert_eq!(api.login_endpoints(), vec![endpoint("de")]);
        assert_eq!(store.settings_saves(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejects_blank_settings_without_network() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        let store = MemoryStore::new();

        let err = establish_session(api.clone(), &store, Settings::new("", "secret", "eu"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::InvalidSettings(_)));
        assert_eq!(api.login_calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejects_unknown_region() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        let store = MemoryStore::new();

        let err = establish_session(api.clone(), &store, settings("xx")).await.unwrap_err();

        assert_eq!(err, ScrapeError::UnknownRegion { region: "xx".into() });
        assert_eq!(api.login_calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wrong_region_is_discovered_persisted_and_retried() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Err(ScrapeError::WrongRegion { region: "us".into() }));
        api.push_login(Err(ScrapeError::WrongRegion { region: "us".into() }));
        api.push_login(Ok(ScriptedLinkUpApi::session(endpoint("us"))));
        api.push_connections(Ok(vec![ScriptedLinkUpApi::connection("patient-9")]));
        let store = MemoryStore::new();

        let established = establish_session(api.clone(), &store, settings("de")).await.unwrap();

        assert_eq!(established.settings.libre_link_up_region, "us");
        assert_eq!(established.patient_id, "patient-9");
        assert_eq!(
            api.login_endpoints(),
            vec![endpoint("de"), DEFAULT_ENDPOINT, endpoint("us")]
        );
        assert_eq!(store.settings_saves(), 1);
        assert_eq!(store.stored_settings().unwrap().libre_link_up_region, "us");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_wrong_region_is_terminal() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Err(ScrapeError::WrongRegion { region: "us".into() }));
        api.push_login(Err(ScrapeError::WrongRegion { region: "us".into() }));
        api.push_login(Err(ScrapeError::WrongRegion { region: "ca".into() }));
        let store = MemoryStore::new();

        let err = establish_session(api.clone(), &store, settings("de")).await.unwrap_err();

        assert_eq!(err, ScrapeError::WrongRegion { region: "ca".into() });
        assert_eq!(api.login_calls(), 3);
        assert_eq!(api.connection_calls(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_credentials_stop_construction() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Err(ScrapeError::InvalidCredentials));
        let store = MemoryStore::new();

        let err = establish_session(api.clone(), &store, settings("eu")).await.unwrap_err();

        assert_eq!(err, ScrapeError::InvalidCredentials);
        assert_eq!(api.login_calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn zero_connections_is_an_error() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Ok(ScriptedLinkUpApi::session(endpoint("eu"))));
        api.push_connections(Ok(Vec::new()));
        let store = MemoryStore::new();

        let err = establish_session(api, &store, settings("eu")).await.unwrap_err();

        assert_eq!(err, ScrapeError::UnexpectedConnectionCount { count: 0 });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn multiple_connections_is_an_error() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Ok(ScriptedLinkUpApi::session(endpoint("eu"))));
        api.push_connections(Ok(vec![
            ScriptedLinkUpApi::connection("a"),
            ScriptedLinkUpApi::connection("b"),
        ]));
        let store = MemoryStore::new();

        let err = establish_session(api, &store, settings("eu")).await.unwrap_err();

        assert_eq!(err, ScrapeError::UnexpectedConnectionCount { count: 2 });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_region_save_is_reported() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Err(ScrapeError::WrongRegion { region: "us".into() }));
        api.push_login(Err(ScrapeError::WrongRegion { region: "us".into() }));
        let store = MemoryStore::new();
        store.fail_writes(true);

        let err = establish_session(api, &store, settings("de")).await.unwrap_err();

        assert!(matches!(err, ScrapeError::Store(GlucolinkError::Database(_))));
    }
}
