//! Bearer-token guard for the Admin API.
//!
//! The token is a single configured value; the guard only compares it with
//! the `Authorization` header of each request.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Middleware rejecting requests without the configured admin token.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` if the header is missing, is not a
/// bearer credential, or carries the wrong token.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Some(token) = header.and_then(bearer_token) else {
        debug!(path = %request.uri().path(), "admin request without bearer token");
        return Err(ApiError::Unauthorized("Missing authentication token"));
    };

    if !tokens_match(token, &state.settings.admin_token) {
        debug!(path = %request.uri().path(), "admin request with invalid token");
        return Err(ApiError::Unauthorized("Invalid authentication token"));
    }

    Ok(next.run(request).await)
}

/// Extracts the credential from a `Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Compares fixed-size digests so the comparison does not depend on where
/// the strings first differ.
fn tokens_match(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}
