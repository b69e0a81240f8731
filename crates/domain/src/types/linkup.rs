//! LibreLinkUp data model
//!
//! Field names follow the remote JSON so the types deserialize directly from
//! response envelopes. Unknown fields are ignored and most fields default,
//! since the vendor omits them freely.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::endpoint::Endpoint;

/// Rolling authentication ticket as delivered by the API.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTicket {
    #[serde(default)]
    pub token: String,
    /// Absolute expiry, unix seconds.
    #[serde(default)]
    pub expires: i64,
    #[serde(default)]
    pub duration: i64,
}

impl fmt::Debug for AuthTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTicket")
            .field("token", &"<redacted>")
            .field("expires", &self.expires)
            .field("duration", &self.duration)
            .finish()
    }
}

/// An authenticated session bound to one regional endpoint.
///
/// Every successful call made with the session returns a fresh ticket which
/// replaces the held one through [`Session::renew`].
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    ticket: AuthTicket,
    endpoint: Endpoint,
}

impl Session {
    pub fn new(ticket: AuthTicket, endpoint: Endpoint) -> Self {
        Self { ticket, endpoint }
    }

    pub fn token(&self) -> &str {
        &self.ticket.token
    }

    pub fn has_token(&self) -> bool {
        !self.ticket.token.is_empty()
    }

    pub fn ticket(&self) -> &AuthTicket {
        &self.ticket
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Overwrite token, expiry and duration with the ticket from the latest
    /// response.
    pub fn renew(&mut self, ticket: AuthTicket) {
        self.ticket = ticket;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint.region)
            .field("ticket", &self.ticket)
            .finish()
    }
}

/// A patient linked to the viewer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub target_low: i32,
    #[serde(default)]
    pub target_high: i32,
    #[serde(default)]
    pub glucose_measurement: Option<GlucoseMeasurement>,
}

/// A raw glucose sample in vendor format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlucoseMeasurement {
    /// Sensor-side timestamp in UTC, `M/D/YYYY h:mm:ss AM|PM`.
    #[serde(default)]
    pub factory_timestamp: String,
    /// Same instant rendered in the patient's local time.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, rename = "type")]
    pub kind: i32,
    #[serde(default)]
    pub value_in_mg_per_dl: i32,
    #[serde(default)]
    pub measurement_color: i32,
    #[serde(default)]
    pub glucose_units: i32,
    /// Concentration in mmol/L.
    #[serde(default)]
    pub value: f64,
    #[serde(default, rename = "isHigh")]
    pub is_high: bool,
    #[serde(default, rename = "isLow")]
    pub is_low: bool,
}

/// Sensor currently paired with the patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSensor {
    #[serde(default)]
    pub sensor: SensorInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorInfo {
    #[serde(default, rename = "deviceId")]
    pub device_id: String,
    #[serde(default, rename = "sn")]
    pub serial_number: String,
    /// Activation time, unix seconds.
    #[serde(default, rename = "a")]
    pub activated_at: i64,
}

/// Payload of a graph request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    #[serde(default)]
    pub connection: Connection,
    #[serde(default)]
    pub active_sensors: Vec<ActiveSensor>,
    #[serde(default)]
    pub graph_data: Vec<GlucoseMeasurement>,
}
