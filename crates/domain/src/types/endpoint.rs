//! Regional LibreLinkUp endpoints
//!
//! LibreLinkUp partitions accounts by region; each region has its own API
//! host. The catalog is closed: an account whose region is not listed here
//! cannot be scraped.

use std::fmt;

use serde::Serialize;

/// A region code and the API host serving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    pub region: &'static str,
    pub hostname: &'static str,
}

macro_rules! regional {
    ($region:literal) => {
        Endpoint { region: $region, hostname: concat!("api-", $region, ".libreview.io") }
    };
}

pub const ENDPOINTS: [Endpoint; 10] = [
    regional!("ae"),
    regional!("ap"),
    regional!("au"),
    regional!("ca"),
    regional!("de"),
    regional!("eu"),
    regional!("eu2"),
    regional!("fr"),
    regional!("jp"),
    regional!("us"),
];

/// Endpoint used to discover an account's real region.
pub const DEFAULT_ENDPOINT: Endpoint = regional!("eu");

/// Look up the endpoint for a region code. Matching is exact.
pub fn endpoint_by_region(region: &str) -> Option<Endpoint> {
    ENDPOINTS.iter().copied().find(|endpoint| endpoint.region == region)
}

impl Endpoint {
    pub fn origin(&self) -> String {
        format!("https://{}", self.hostname)
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.origin(), Self::login_path())
    }

    pub fn connections_url(&self) -> String {
        format!("{}{}", self.origin(), Self::connections_path())
    }

    pub fn graph_url(&self, patient_id: &str) -> String {
        format!("{}{}", self.origin(), Self::graph_path(patient_id))
    }

    fn login_path() -> &'static str {
        "/llu/auth/login"
    }

    fn connections_path() -> &'static str {
        "/llu/connections/"
    }

    fn graph_path(patient_id: &str) -> String {
        format!("/llu/connections/{patient_id}/graph")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.region, self.hostname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_catalog_region() {
        for endpoint in ENDPOINTS {
            assert_eq!(endpoint_by_region(endpoint.region), Some(endpoint));
        }
        assert_eq!(endpoint_by_region("us").unwrap().hostname, "api-us.libreview.io");
        assert_eq!(endpoint_by_region("eu2").unwrap().hostname, "api-eu2.libreview.io");
    }

    #[test]
    fn unknown_region_is_none() {
        assert_eq!(endpoint_by_region("xx"), None);
        assert_eq!(endpoint_by_region("EU"), None);
        assert_eq!(endpoint_by_region(""), None);
    }

    #[test]
    fn default_is_eu() {
        assert_eq!(DEFAULT_ENDPOINT.region, "eu");
        assert!(ENDPOINTS.contains(&DEFAULT_ENDPOINT));
    }

    #[test]
    fn builds_regional_urls() {
        let endpoint = endpoint_by_region("de").unwrap();
        assert_eq!(endpoint.login_url(), "https://api-de.libreview.io/llu/auth/login");
        assert_eq!(endpoint.connections_url(), "https://api-de.libreview.io/llu/connections/");
        assert_eq!(
            endpoint.graph_url("abc-123"),
            "https://api-de.libreview.io/llu/connections/abc-123/graph"
        );
    }
}
