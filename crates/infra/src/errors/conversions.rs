//! Conversions from external infrastructure errors into domain errors.

use glucolink_domain::GlucolinkError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GlucolinkError);

impl From<InfraError> for GlucolinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GlucolinkError> for InfraError {
    fn from(value: GlucolinkError) -> Self {
        InfraError(value)
    }
}

trait IntoGlucolinkError {
    fn into_glucolink(self) -> GlucolinkError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → GlucolinkError */
/* -------------------------------------------------------------------------- */

impl IntoGlucolinkError for SqlError {
    fn into_glucolink(self) -> GlucolinkError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => GlucolinkError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        GlucolinkError::Database("database is locked".into())
                    }
                    ErrorCode::NotADatabase => {
                        GlucolinkError::Database("file is not a SQLite database".into())
                    }
                    ErrorCode::ReadOnly => {
                        GlucolinkError::Database("database is read-only".into())
                    }
                    _ => GlucolinkError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => GlucolinkError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                GlucolinkError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                GlucolinkError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => GlucolinkError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => GlucolinkError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_glucolink())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → GlucolinkError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(GlucolinkError::Database(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GlucolinkError */
/* -------------------------------------------------------------------------- */

impl IntoGlucolinkError for HttpError {
    fn into_glucolink(self) -> GlucolinkError {
        if self.is_timeout() {
            return GlucolinkError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return GlucolinkError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return GlucolinkError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => GlucolinkError::Auth(message),
                404 => GlucolinkError::NotFound(message),
                400..=499 => GlucolinkError::InvalidInput(message),
                _ => GlucolinkError::Network(message),
            };
        }

        GlucolinkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_glucolink())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
