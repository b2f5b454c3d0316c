//! Admin routes for captured events.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use request_nest_capture::application::query_handlers::{self, EventView};
use request_nest_core::error::DomainError;
use request_nest_core::model::{BinId, EventId, EventSummary, ListLimit};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiError;
use crate::routes::path_params;
use crate::state::AppState;

/// Query string for `GET /api/bins/{bin_id}/events`.
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    /// Maximum number of events; defaults to 50, clamped to 100.
    pub limit: Option<i64>,
}

/// Response body for the event list.
#[derive(Debug, Serialize)]
pub struct EventListResponse {
    /// Event summaries, newest first.
    pub events: Vec<EventSummary>,
}

/// GET /api/bins/{bin_id}/events
#[instrument(skip_all)]
async fn list_events(
    State(state): State<AppState>,
    bin_id: Result<Path<String>, PathRejection>,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> Result<Json<EventListResponse>, ApiError> {
    let bin_id = path_params(bin_id)?;
    let Query(params) = params.map_err(|rejection| {
        DomainError::Validation(format!("invalid query string: {}", rejection.body_text()))
    })?;
    let limit = ListLimit::new(params.limit)?;

    let events = query_handlers::list_events_for_bin(
        &BinId::from(bin_id),
        limit,
        state.bin_repository.as_ref(),
        state.event_repository.as_ref(),
    )
    .await?;
    Ok(Json(EventListResponse { events }))
}

/// GET /api/events/{event_id}
#[instrument(skip_all)]
async fn get_event(
    State(state): State<AppState>,
    event_id: Result<Path<String>, PathRejection>,
) -> Result<Json<EventView>, ApiError> {
    let event_id = path_params(event_id)?;
    let view =
        query_handlers::get_event(&EventId::from(event_id), state.event_repository.as_ref())
            .await?;
    Ok(Json(view))
}

/// Returns the router for event inspection.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bins/{bin_id}/events", get(list_events))
        .route("/api/events/{event_id}", get(get_event))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone, Utc};
    use request_nest_core::model::{Bin, Event};
    use request_nest_core::repository::{BinRepository, EventRepository};
    use request_nest_test_support::{InMemoryBinRepository, InMemoryEventRepository};
    use tower::ServiceExt;

    use crate::routes::testing::{json_body, state_with};

    async fn seeded_state(event_count: usize) -> crate::state::AppState {
        let bins = Arc::new(InMemoryBinRepository::new());
        let events = Arc::new(InMemoryEventRepository::new(Arc::clone(&bins)));
        let base = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        bins.create(Bin {
            id: BinId::from("b_seed"),
            name: Some("seed".to_owned()),
            created_at: base,
        })
        .await
        .unwrap();
        for i in 0..event_count {
            let offset = i64::try_from(i).unwrap();
            events
                .create(Event {
                    id: EventId::from(format!("e_{i:04}")),
                    bin_id: BinId::from("b_seed"),
                    method: "POST".to_owned(),
                    path: "/".to_owned(),
                    query_params: BTreeMap::from([("n".to_owned(), i.to_string())]),
                    headers: BTreeMap::new(),
                    body: vec![0xff, 0x00],
                    remote_ip: None,
                    size_bytes: 2,
                    created_at: base + Duration::seconds(offset),
                })
                .await
                .unwrap();
        }
        state_with(bins, events, 1024)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_events_returns_newest_first_with_default_limit() {
        // Arrange
        let app = router().with_state(seeded_state(60).await);

        // Act
        let response = app.oneshot(get("/api/bins/b_seed/events")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let events = json["events"].as_array().unwrap();
        assert_eq!(events.len(), 50);
        assert_eq!(events[0]["id"], "e_0059");
        assert_eq!(events[0]["size_bytes"], 2);
        assert!(events[0].get("body").is_none());
    }

    #[tokio::test]
    async fn test_list_events_clamps_oversized_limit() {
        // Arrange
        let app = router().with_state(seeded_state(120).await);

        // Act
        let response = app
            .oneshot(get("/api/bins/b_seed/events?limit=500"))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["events"].as_array().unwrap().len(), 100);
    }

    #[tokio::test]
    async fn test_list_events_rejects_zero_limit() {
        // Arrange
        let app = router().with_state(seeded_state(1).await);

        // Act
        let response = app
            .oneshot(get("/api/bins/b_seed/events?limit=0"))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_list_events_rejects_non_numeric_limit() {
        // Arrange
        let app = router().with_state(seeded_state(1).await);

        // Act
        let response = app
            .oneshot(get("/api/bins/b_seed/events?limit=lots"))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_list_events_for_unknown_bin_returns_404() {
        // Arrange
        let app = router().with_state(seeded_state(0).await);

        // Act
        let response = app.oneshot(get("/api/bins/b_missing/events")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "bin_not_found");
    }

    #[tokio::test]
    async fn test_get_event_returns_full_detail_with_base64_body() {
        // Arrange
        let app = router().with_state(seeded_state(1).await);

        // Act
        let response = app.oneshot(get("/api/events/e_0000")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["bin_id"], "b_seed");
        assert_eq!(json["query_params"]["n"], "0");
        assert_eq!(json["body"], "/wA=");
        assert_eq!(json["body_encoding"], "base64");
    }

    #[tokio::test]
    async fn test_get_unknown_event_returns_404() {
        // Arrange
        let app = router().with_state(seeded_state(0).await);

        // Act
        let response = app.oneshot(get("/api/events/e_missing")).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "event_not_found");
    }
}
