//! Route modules: the public ingest surface, the Admin API, health probes
//! and the web UI.

use axum::extract::Path;
use axum::extract::rejection::PathRejection;
use axum::http::{Method, Uri};
use request_nest_core::error::DomainError;

use crate::error::ApiError;

pub mod bins;
pub mod events;
pub mod health;
pub mod ingest;
pub mod web;

/// Structured 404 for paths no router matches.
pub async fn fallback(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_owned())
}

/// Structured 405 for known paths hit with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_owned(),
    }
}

/// Unwraps path parameters, turning an undecodable segment into a
/// validation error.
pub(crate) fn path_params<T>(
    extracted: Result<Path<T>, PathRejection>,
) -> Result<T, DomainError> {
    extracted
        .map(|Path(params)| params)
        .map_err(|rejection| DomainError::Validation(rejection.body_text()))
}
