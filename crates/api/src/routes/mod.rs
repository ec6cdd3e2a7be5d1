//! HTTP routes and error mapping

pub mod sync;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chorale_domain::ChoraleError;
use serde::Serialize;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert domain errors to HTTP responses
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// A 400 with a verbatim message, for request-shape errors that never
    /// reached the domain layer.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse { error: self.message });
        (self.status, body).into_response()
    }
}

impl From<ChoraleError> for ApiError {
    fn from(err: ChoraleError) -> Self {
        let status = match err {
            ChoraleError::Auth(_) => StatusCode::UNAUTHORIZED,
            ChoraleError::Forbidden(_) => StatusCode::FORBIDDEN,
            ChoraleError::Config(_) | ChoraleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChoraleError::Conflict(_) => StatusCode::CONFLICT,
            // NotFound only surfaces when a row vanishes mid-sync, which is a
            // server-side fault rather than a bad request target.
            ChoraleError::NotFound(_)
            | ChoraleError::Database(_)
            | ChoraleError::Network(_)
            | ChoraleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}
