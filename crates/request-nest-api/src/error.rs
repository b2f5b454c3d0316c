//! request-nest — API error types.

use axum::Json;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use request_nest_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying embedded migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The tracing pipeline could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// A domain or store failure.
    Domain(DomainError),
    /// Missing or wrong admin bearer token.
    Unauthorized(&'static str),
    /// No route matches the request path.
    RouteNotFound(String),
    /// The path exists but does not accept this method.
    MethodNotAllowed {
        /// Rejected method.
        method: String,
        /// Request path.
        path: String,
    },
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Domain(err) => {
                let (status, code) = match err {
                    DomainError::BinNotFound(_) => (StatusCode::NOT_FOUND, "bin_not_found"),
                    DomainError::EventNotFound(_) => (StatusCode::NOT_FOUND, "event_not_found"),
                    DomainError::PayloadTooLarge { .. } => {
                        (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
                    }
                    DomainError::ReferentialIntegrity(_) => {
                        (StatusCode::NOT_FOUND, "referential_integrity")
                    }
                    DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                    DomainError::Unavailable(_) => {
                        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
                    }
                    DomainError::Infrastructure(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
                    }
                };
                let message = match err {
                    DomainError::Unavailable(_) => "storage temporarily unavailable".to_owned(),
                    DomainError::Infrastructure(_) => "internal server error".to_owned(),
                    other => other.to_string(),
                };
                (status, code, message)
            }
            Self::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", (*message).to_owned())
            }
            Self::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                "route_not_found",
                format!("no route for '{path}'"),
            ),
            Self::MethodNotAllowed { method, path } => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                format!("method {method} not allowed for '{path}'"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = error_code, detail = ?self, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::Unauthorized(_)) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
