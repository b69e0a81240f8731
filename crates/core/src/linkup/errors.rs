//! Scraper error taxonomy

use glucolink_domain::GlucolinkError;
use thiserror::Error;

/// Failures raised while establishing a session or running a cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScrapeError {
    #[error("LibreLinkUp settings are incomplete: {0}")]
    InvalidSettings(String),

    #[error("unsupported LibreLinkUp region '{region}'")]
    UnknownRegion { region: String },

    #[error("LibreLinkUp redirected to region '{region}' which has no known endpoint")]
    RegionUnresolvable { region: String },

    #[error("LibreLinkUp rejected the username and password")]
    InvalidCredentials,

    #[error("account belongs to LibreLinkUp region '{region}'")]
    WrongRegion { region: String },

    #[error("expected exactly one LibreLinkUp connection, found {count}")]
    UnexpectedConnectionCount { count: usize },

    #[error("LibreLinkUp error (status {status}): {message}")]
    Remote { status: i32, message: String },

    #[error("request to LibreLinkUp failed: {0}")]
    Transport(String),

    #[error("LibreLinkUp responded with HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("could not decode LibreLinkUp response: {0}")]
    Decode(String),

    #[error("invalid sample timestamp '{raw}'")]
    TimestampParse { raw: String },

    #[error("store operation failed: {0}")]
    Store(#[from] GlucolinkError),
}

impl ScrapeError {
    /// Stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSettings(_) => "invalid_settings",
            Self::UnknownRegion { .. } => "unknown_region",
            Self::RegionUnresolvable { .. } => "region_unresolvable",
            Self::InvalidCredentials => "invalid_credentials",
            Self::WrongRegion { .. } => "wrong_region",
            Self::UnexpectedConnectionCount { .. } => "unexpected_connection_count",
            Self::Remote { .. } => "remote",
            Self::Transport(_) => "transport",
            Self::HttpStatus { .. } => "http_status",
            Self::Decode(_) => "decode",
            Self::TimestampParse { .. } => "timestamp_parse",
            Self::Store(_) => "store",
        }
    }

    /// Text suitable for showing to the account owner.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => {
                "Login failed, please verify username and password".to_string()
            }
            Self::InvalidSettings(_) => {
                "LibreLinkUp username, password and region must be set".to_string()
            }
            Self::UnknownRegion { region } | Self::RegionUnresolvable { region } => {
                format!("LibreLinkUp region '{region}' is not supported")
            }
            Self::UnexpectedConnectionCount { count } => format!(
                "LibreLinkUp account must follow exactly one patient, it follows {count}"
            ),
            other => other.to_string(),
        }
    }

    /// Whether the failure comes from the network path rather than from
    /// the account or local state.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }
}

impl From<ScrapeError> for GlucolinkError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Store(inner) => inner,
            ScrapeError::InvalidSettings(_)
            | ScrapeError::UnknownRegion { .. }
            | ScrapeError::TimestampParse { .. } => Self::InvalidInput(err.to_string()),
            ScrapeError::InvalidCredentials | ScrapeError::WrongRegion { .. } => {
                Self::Auth(err.to_string())
            }
            ScrapeError::Transport(_) | ScrapeError::HttpStatus { .. } => {
                Self::Network(err.to_string())
            }
            ScrapeError::RegionUnresolvable { .. }
            | ScrapeError::UnexpectedConnectionCount { .. }
            | ScrapeError::Remote { .. }
            | ScrapeError::Decode(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_failure_has_friendly_message() {
        let err = ScrapeError::InvalidCredentials;
        assert_eq!(err.user_message(), "Login failed, please verify username and password");
        assert_eq!(err.kind(), "invalid_credentials");
    }

    #[test]
    fn store_errors_unwrap_into_domain_error() {
        let inner = GlucolinkError::Database("locked".into());
        let err: ScrapeError = inner.clone().into();
        assert_eq!(GlucolinkError::from(err), inner);
    }

    #[test]
    fn maps_categories_onto_domain_errors() {
        let network: GlucolinkError = ScrapeError::HttpStatus { status: 502 }.into();
        assert!(matches!(network, GlucolinkError::Network(_)));

        let auth: GlucolinkError = ScrapeError::InvalidCredentials.into();
        assert!(matches!(auth, GlucolinkError::Auth(_)));

        let input: GlucolinkError =
            ScrapeError::UnknownRegion { region: "xx".into() }.into();
        assert!(matches!(input, GlucolinkError::InvalidInput(_)));
    }

    #[test]
    fn only_network_failures_are_transient() {
        assert!(ScrapeError::Transport("reset".into()).is_transient());
        assert!(!ScrapeError::Decode("eof".into()).is_transient());
        assert!(!ScrapeError::InvalidCredentials.is_transient());
    }
}
