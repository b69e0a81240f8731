//! LibreLinkUp account settings
//!
//! Persisted by the store as a single JSON document.

use serde::{Deserialize, Serialize};

use crate::errors::{GlucolinkError, Result};

/// Credentials and region of the LibreLinkUp viewer account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub libre_link_up_username: String,
    pub libre_link_up_password: String,
    pub libre_link_up_region: String,
}

impl Settings {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            libre_link_up_username: username.into(),
            libre_link_up_password: password.into(),
            libre_link_up_region: region.into(),
        }
    }

    /// True when username, password and region are all non-blank.
    pub fn is_valid(&self) -> bool {
        [&self.libre_link_up_username, &self.libre_link_up_password, &self.libre_link_up_region]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| GlucolinkError::InvalidInput(format!("invalid settings JSON: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| GlucolinkError::Internal(format!("failed to encode settings: {e}")))
    }
}
