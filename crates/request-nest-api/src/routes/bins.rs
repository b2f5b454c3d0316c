//! Admin routes for bins.

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use request_nest_bins::application::query_handlers::{self, BinView};
use request_nest_bins::application::command_handlers;
use request_nest_bins::domain::commands;
use request_nest_core::command::new_correlation_id;
use request_nest_core::error::DomainError;
use request_nest_core::model::BinId;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::routes::path_params;
use crate::state::AppState;

/// Request body for `POST /api/bins`. An empty body is accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBinRequest {
    /// Optional human-readable name for the bin.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response body for `GET /api/bins`.
#[derive(Debug, Serialize)]
pub struct BinListResponse {
    /// Bins, newest first.
    pub bins: Vec<BinView>,
}

fn parse_create_request(body: &[u8]) -> Result<CreateBinRequest, DomainError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateBinRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| DomainError::Validation(format!("invalid request body: {e}")))
}

/// POST /api/bins
#[instrument(skip_all)]
async fn create_bin(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<BinView>), ApiError> {
    let request = parse_create_request(&body)?;
    let command = commands::CreateBin {
        correlation_id: new_correlation_id(),
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling create_bin command");

    let bin = command_handlers::handle_create_bin(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.bin_repository.as_ref(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(BinView::from_bin(&bin, &state.settings.base_url)),
    ))
}

/// GET /api/bins
#[instrument(skip_all)]
async fn list_bins(State(state): State<AppState>) -> Result<Json<BinListResponse>, ApiError> {
    let bins =
        query_handlers::list_bins(&state.settings.base_url, state.bin_repository.as_ref()).await?;
    Ok(Json(BinListResponse { bins }))
}

/// GET /api/bins/{bin_id}
#[instrument(skip_all)]
async fn get_bin(
    State(state): State<AppState>,
    bin_id: Result<Path<String>, PathRejection>,
) -> Result<Json<BinView>, ApiError> {
    let bin_id = path_params(bin_id)?;
    let view = query_handlers::get_bin(
        &BinId::from(bin_id),
        &state.settings.base_url,
        state.bin_repository.as_ref(),
    )
    .await?;
    Ok(Json(view))
}

/// Returns the router for bin administration.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bins", post(create_bin).get(list_bins))
        .route("/api/bins/{bin_id}", get(get_bin))
}
