//! Conversions from external infrastructure errors into domain errors.

use chorale_domain::ChoraleError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ChoraleError);

impl From<InfraError> for ChoraleError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ChoraleError> for InfraError {
    fn from(value: ChoraleError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoChoraleError {
    fn into_chorale(self) -> ChoraleError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → ChoraleError */
/* -------------------------------------------------------------------------- */

impl IntoChoraleError for SqlError {
    fn into_chorale(self) -> ChoraleError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        ChoraleError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        ChoraleError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        ChoraleError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        ChoraleError::Database("foreign key constraint violation".into())
                    }
                    _ => ChoraleError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => ChoraleError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                ChoraleError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                ChoraleError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => ChoraleError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidParameterName(parameter_name) => {
                ChoraleError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => {
                ChoraleError::Database(format!("invalid database path: {}", path.to_string_lossy()))
            }
            RE::InvalidQuery => ChoraleError::Database("invalid SQL query".into()),
            other => ChoraleError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_chorale())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → ChoraleError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(ChoraleError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ChoraleError */
/* -------------------------------------------------------------------------- */

impl IntoChoraleError for HttpError {
    fn into_chorale(self) -> ChoraleError {
        if self.is_timeout() {
            return ChoraleError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ChoraleError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => ChoraleError::Auth(message),
                404 => ChoraleError::NotFound(message),
                429 => ChoraleError::Network(message),
                400..=499 => ChoraleError::InvalidInput(message),
                500..=599 => ChoraleError::Network(message),
                _ => ChoraleError::Network(message),
            };
        }

        ChoraleError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_chorale())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
