//! Response envelopes as sent by LibreLinkUp.

use glucolink_domain::AuthTicket;
use serde::{Deserialize, Serialize};

/// Outer envelope shared by every endpoint. `data` is kept raw until the
/// status has been checked, since error responses carry arbitrary payloads.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope {
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub error: Option<RemoteError>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub ticket: Option<AuthTicket>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RemoteError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginData {
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(default)]
    pub auth_ticket: Option<AuthTicket>,
    #[serde(default)]
    pub redirect: bool,
    #[serde(default)]
    pub region: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct LoginUser {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}
