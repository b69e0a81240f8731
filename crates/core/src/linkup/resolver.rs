//! Account region discovery
//!
//! LibreLinkUp accepts logins on any regional host but answers with a
//! redirect naming the account's home region when it is the wrong one.

use std::sync::Arc;

use glucolink_domain::{endpoint_by_region, Endpoint, DEFAULT_ENDPOINT};
use tracing::{debug, info};

use super::errors::ScrapeError;
use super::ports::LinkUpApi;

/// Finds the regional endpoint an account belongs to.
pub struct AccountResolver {
    api: Arc<dyn LinkUpApi>,
    probe: Endpoint,
}

impl AccountResolver {
    /// Resolver probing the default (`eu`) endpoint.
    pub fn new(api: Arc<dyn LinkUpApi>) -> Self {
        Self { api, probe: DEFAULT_ENDPOINT }
    }

    /// Log in at the probe endpoint and follow the redirect, if any.
    ///
    /// A successful login means the probe endpoint is already the right one;
    /// the session it produced is dropped.
    pub async fn discover_endpoint(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Endpoint, ScrapeError> {
        debug!(endpoint = %self.probe, "probing LibreLinkUp account region");

        match self.api.login(username, password, self.probe).await {
            Ok(_) => Ok(self.probe),
            Err(ScrapeError::WrongRegion { region }) => {
                let endpoint = endpoint_by_region(&region)
                    .ok_or_else(|| ScrapeError::RegionUnresolvable { region: region.clone() })?;
                info!(region = %region, endpoint = %endpoint, "discovered LibreLinkUp region");
                Ok(endpoint)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLinkUpApi;

    #[tokio::test(flavor = "multi_thread")]
    async fn follows_redirect_to_known_region() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Err(ScrapeError::WrongRegion { region: "us".into() }));

        let resolver = AccountResolver::new(api.clone());
        let endpoint = resolver.discover_endpoint("user", "pass").await.unwrap();

        assert_eq!(endpoint.region, "us");
        assert_eq!(api.login_endpoints(), vec![DEFAULT_ENDPOINT]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn keeps_probe_when_login_succeeds() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Ok(ScriptedLinkUpApi::session(DEFAULT_ENDPOINT)));

        let resolver = AccountResolver::new(api);
        let endpoint = resolver.discover_endpoint("user", "pass").await.unwrap();

        assert_eq!(endpoint, DEFAULT_ENDPOINT);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_redirect_region_is_unresolvable() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Err(ScrapeError::WrongRegion { region: "mars".into() }));

        let resolver = AccountResolver::new(api);
        let err = resolver.discover_endpoint("user", "pass").await.unwrap_err();

        assert_eq!(err, ScrapeError::RegionUnresolvable { region: "mars".into() });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn other_login_failures_pass_through() {
        let api = Arc::new(ScriptedLinkUpApi::new());
        api.push_login(Err(ScrapeError::InvalidCredentials));

        let resolver = AccountResolver::new(api);
        let err = resolver.discover_endpoint("user", "bad").await.unwrap_err();

        assert_eq!(err, ScrapeError::InvalidCredentials);
    }
}
