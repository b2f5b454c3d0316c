//! Liveness and readiness probes.

use axum::{Json, Router, extract::State, routing::get};
use request_nest_core::error::DomainError;
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready
///
/// Succeeds only when the database answers a trivial query within the
/// configured store timeout.
async fn readiness(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let probe = sqlx::query("SELECT 1").execute(&state.db_pool);
    match tokio::time::timeout(state.settings.db_timeout, probe).await {
        Ok(Ok(_)) => Ok(Json(HealthResponse {
            status: "ready",
            version: env!("CARGO_PKG_VERSION"),
        })),
        Ok(Err(err)) => {
            warn!(error = %err, "readiness probe failed");
            Err(DomainError::Unavailable(err.to_string()).into())
        }
        Err(_) => {
            warn!("readiness probe timed out");
            Err(DomainError::Unavailable("readiness probe timed out".to_owned()).into())
        }
    }
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
}
