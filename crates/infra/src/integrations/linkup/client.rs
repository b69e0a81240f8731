//! LibreLinkUp session client

use async_trait::async_trait;
use glucolink_core::{LinkUpApi, ScrapeError};
use glucolink_domain::constants::{
    LINKUP_PRODUCT, LINKUP_STATUS_BAD_CREDENTIALS, LINKUP_USER_AGENT, LINKUP_VERSION,
};
use glucolink_domain::{Connection, Endpoint, GlucolinkError, GraphData, ScraperConfig, Session};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::wire::{Envelope, LoginData, LoginRequest};
use crate::http::HttpClient;

/// `LinkUpApi` implementation speaking to the regional LibreLinkUp hosts.
#[derive(Clone)]
pub struct LinkUpClient {
    http: HttpClient,
    origin_override: Option<Url>,
}

impl LinkUpClient {
    /// Wrap an existing transport. When `origin_override` is set, every
    /// request goes to that origin regardless of the session's endpoint.
    pub fn new(http: HttpClient, origin_override: Option<&str>) -> Result<Self, GlucolinkError> {
        let origin_override = origin_override
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    GlucolinkError::Config(format!("invalid LibreLinkUp origin '{raw}': {e}"))
                })
            })
            .transpose()?;

        Ok(Self { http, origin_override })
    }

    /// Build a client with the vendor headers and the configured timeout.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, GlucolinkError> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .user_agent(LINKUP_USER_AGENT)
            .default_headers(vendor_headers())
            .build()?;

        Self::new(http, config.origin_override.as_deref())
    }

    /// Parse a regional URL, moving it onto the override origin when set.
    fn url(&self, regional: &str) -> Result<Url, ScrapeError> {
        let url = Url::parse(regional)
            .map_err(|e| ScrapeError::Transport(format!("invalid endpoint URL '{regional}': {e}")))?;

        match &self.origin_override {
            Some(origin) => origin.join(url.path()).map_err(|e| {
                ScrapeError::Transport(format!("invalid path '{}': {e}", url.path()))
            }),
            None => Ok(url),
        }
    }

    fn authorized(&self, method: Method, url: Url, session: &Session) -> RequestBuilder {
        let request = self.http.request(method, url);
        if session.has_token() {
            request.bearer_auth(session.token())
        } else {
            request
        }
    }

    /// Send one request and unwrap the envelope down to its raw `data`.
    ///
    /// A status of [`LINKUP_STATUS_BAD_CREDENTIALS`] is reported as
    /// [`ScrapeError::InvalidCredentials`]; any other non-zero status as
    /// [`ScrapeError::Remote`].
    async fn exchange(&self, request: RequestBuilder) -> Result<Envelope, ScrapeError> {
        let response = self.http.send(request).await.map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::HttpStatus { status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(|e| ScrapeError::Transport(e.to_string()))?;
        let envelope: Envelope =
            serde_json::from_slice(&body).map_err(|e| ScrapeError::Decode(e.to_string()))?;

        match envelope.status {
            0 => Ok(envelope),
            LINKUP_STATUS_BAD_CREDENTIALS => Err(ScrapeError::InvalidCredentials),
            status => Err(ScrapeError::Remote {
                status,
                message: envelope.error.map(|e| e.message).unwrap_or_default(),
            }),
        }
    }

    /// Decode the payload and roll the session's ticket forward.
    fn accept<T: DeserializeOwned>(
        envelope: Envelope,
        session: &mut Session,
    ) -> Result<T, ScrapeError> {
        let data = decode_data(envelope.data)?;
        match envelope.ticket {
            Some(ticket) => session.renew(ticket),
            None => warn!(endpoint = %session.endpoint(), "LibreLinkUp response carried no ticket"),
        }
        Ok(data)
    }
}

#[async_trait]
impl LinkUpApi for LinkUpClient {
    #[instrument(skip_all, fields(username = %username, endpoint = %endpoint))]
    async fn login(
        &self,
        username: &str,
        password: &str,
        endpoint: Endpoint,
    ) -> Result<Session, ScrapeError> {
        let url = self.url(&endpoint.login_url())?;
        let request = self
            .http
            .request(Method::POST, url)
            .json(&LoginRequest { email: username, password });

        let envelope = self.exchange(request).await?;
        let data: LoginData = decode_data(envelope.data)?;

        if data.redirect {
            debug!(region = %data.region, "LibreLinkUp login redirected");
            return Err(ScrapeError::WrongRegion { region: data.region });
        }

        let ticket = data
            .auth_ticket
            .filter(|ticket| !ticket.token.is_empty())
            .ok_or_else(|| ScrapeError::Decode("login response carried no auth ticket".into()))?;

        debug!(
            user_id = %data.user.map(|user| user.id).unwrap_or_default(),
            expires = ticket.expires,
            "LibreLinkUp login succeeded"
        );

        Ok(Session::new(ticket, endpoint))
    }

    #[instrument(skip_all, fields(endpoint = %session.endpoint()))]
    async fn list_connections(
        &self,
        session: &mut Session,
    ) -> Result<Vec<Connection>, ScrapeError> {
        let url = self.url(&session.endpoint().connections_url())?;
        let envelope = self.exchange(self.authorized(Method::GET, url, session)).await?;
        let connections: Vec<Connection> = Self::accept(envelope, session)?;

        debug!(count = connections.len(), "listed LibreLinkUp connections");
        Ok(connections)
    }

    #[instrument(skip_all, fields(endpoint = %session.endpoint(), patient_id = %patient_id))]
    async fn fetch_graph(
        &self,
        session: &mut Session,
        patient_id: &str,
    ) -> Result<GraphData, ScrapeError> {
        let url = self.url(&session.endpoint().graph_url(patient_id))?;
        let envelope = self.exchange(self.authorized(Method::GET, url, session)).await?;
        let graph: GraphData = Self::accept(envelope, session)?;

        debug!(samples = graph.graph_data.len(), "fetched LibreLinkUp graph");
        Ok(graph)
    }
}

/// Headers LibreLinkUp expects from its own mobile client.
fn vendor_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static("version"), HeaderValue::from_static(LINKUP_VERSION));
    headers.insert(HeaderName::from_static("product"), HeaderValue::from_static(LINKUP_PRODUCT));
    headers.insert(reqwest::header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(reqwest::header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(reqwest::header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

fn decode_data<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, ScrapeError> {
    serde_json::from_value(data).map_err(|e| ScrapeError::Decode(e.to_string()))
}

fn transport_error(err: GlucolinkError) -> ScrapeError {
    match err {
        GlucolinkError::Network(message) => ScrapeError::Transport(message),
        other => ScrapeError::Transport(other.to_string()),
    }
}
