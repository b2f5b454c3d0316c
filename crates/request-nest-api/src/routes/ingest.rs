//! Public ingest surface: any method on `/b/{bin_id}` and below is captured
//! as an event of that bin.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{ConnectInfo, Path, Query, Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::request::Parts;
use axum::routing::any;
use axum::{Json, Router};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use request_nest_capture::application::command_handlers;
use request_nest_capture::domain::capture::{CaptureLimits, RawRequest};
use request_nest_capture::domain::commands::CaptureRequest;
use request_nest_core::command::new_correlation_id;
use request_nest_core::error::DomainError;
use request_nest_core::model::{BinId, EventId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::routes::path_params;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Path parameters of the ingest routes. The wildcard tail is taken from
/// the raw URI instead so it keeps its original encoding.
#[derive(Debug, Deserialize)]
struct IngestParams {
    bin_id: String,
}

/// Acknowledgement returned to the sender.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Always `true` on success.
    pub ok: bool,
    /// ID of the stored event.
    pub event_id: EventId,
}

/// ANY /b/{bin_id}/{*path}
#[instrument(skip_all, fields(method = %request.method()))]
async fn ingest(
    State(state): State<AppState>,
    params: Result<Path<IngestParams>, PathRejection>,
    request: Request,
) -> Result<Json<IngestResponse>, ApiError> {
    let IngestParams { bin_id } = path_params(params)?;
    let bin_id = BinId::from(bin_id);
    let limits = state.settings.capture_limits;

    let raw = match read_raw_request(request, limits).await {
        Ok(raw) => raw,
        Err(err) => {
            // An unknown bin outranks any problem with the request itself.
            if !state.bin_repository.exists(&bin_id).await? {
                return Err(DomainError::BinNotFound(bin_id).into());
            }
            return Err(err.into());
        }
    };

    let command = CaptureRequest {
        correlation_id: new_correlation_id(),
        bin_id,
        request: raw,
    };

    let ack = command_handlers::handle_capture_request(
        command,
        limits,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.bin_repository.as_ref(),
        state.event_repository.as_ref(),
    )
    .await?;

    Ok(Json(IngestResponse {
        ok: true,
        event_id: ack.event_id,
    }))
}

async fn read_raw_request(
    request: Request,
    limits: CaptureLimits,
) -> Result<RawRequest, DomainError> {
    let (parts, body) = request.into_parts();
    Ok(RawRequest {
        method: parts.method.as_str().to_owned(),
        path: captured_path(parts.uri.path()).to_owned(),
        query: query_pairs(&parts)?,
        headers: header_pairs(&parts),
        remote_ip: remote_ip(&parts),
        body: read_body(&parts, body, limits).await?,
    })
}

/// Everything after `/b/{bin_id}`, e.g. `/webhook` for `/b/b_x/webhook`.
fn captured_path(uri_path: &str) -> &str {
    let after_prefix = uri_path.strip_prefix("/b/").unwrap_or(uri_path);
    after_prefix
        .find('/')
        .map_or("/", |slash| &after_prefix[slash..])
}

fn query_pairs(parts: &Parts) -> Result<Vec<(String, String)>, DomainError> {
    Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| pairs)
        .map_err(|rejection| {
            DomainError::Validation(format!("invalid query string: {}", rejection.body_text()))
        })
}

fn header_pairs(parts: &Parts) -> Vec<(String, String)> {
    parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// First `X-Forwarded-For` hop, else the socket peer address.
fn remote_ip(parts: &Parts) -> Option<String> {
    let forwarded = parts
        .headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());

    match forwarded {
        Some(first) => Some(first.to_owned()),
        None => parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string()),
    }
}

/// Reads the body, failing as soon as it grows past the cap.
///
/// When the stream overruns, the reported size is only a lower bound.
async fn read_body(
    parts: &Parts,
    body: Body,
    limits: CaptureLimits,
) -> Result<Vec<u8>, DomainError> {
    let declared = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if let Some(declared) = declared {
        limits.check_body_size(declared).inspect_err(|_| {
            debug!(declared, "rejecting body from content-length");
        })?;
    }

    match Limited::new(body, limits.max_body_size).collect().await {
        Ok(collected) => Ok(collected.to_bytes().to_vec()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(DomainError::PayloadTooLarge {
                limit: limits.max_body_size,
                actual: limits.max_body_size.saturating_add(1),
            })
        }
        Err(err) => Err(DomainError::Validation(format!(
            "failed to read request body: {err}"
        ))),
    }
}

/// Returns the ingest router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/b/{bin_id}", any(ingest))
        .route("/b/{bin_id}/", any(ingest))
        .route("/b/{bin_id}/{*path}", any(ingest))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use request_nest_core::model::Bin;
    use request_nest_core::repository::BinRepository;
    use request_nest_test_support::{
        FailingBinRepository, FailingEventRepository, InMemoryBinRepository,
        InMemoryEventRepository,
    };
    use tower::ServiceExt;

    use crate::routes::testing::{json_body, state_with};

    async fn state_with_bin(max_body_size: usize) -> (AppState, Arc<InMemoryEventRepository>) {
        let bins = Arc::new(InMemoryBinRepository::new());
        let events = Arc::new(InMemoryEventRepository::new(Arc::clone(&bins)));
        bins.create(Bin {
            id: BinId::from("b_hooks"),
            name: Some("hooks".to_owned()),
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
        })
        .await
        .unwrap();
        let state = state_with(bins, events.clone(), max_body_size);
        (state, events)
    }

    #[test]
    fn test_captured_path_strips_bin_prefix() {
        assert_eq!(captured_path("/b/b_x"), "/");
        assert_eq!(captured_path("/b/b_x/"), "/");
        assert_eq!(captured_path("/b/b_x/webhook"), "/webhook");
        assert_eq!(captured_path("/b/b_x/a/b%20c/"), "/a/b%20c/");
    }

    #[tokio::test]
    async fn test_ingest_captures_request_and_acknowledges() {
        // Arrange
        let (state, events) = state_with_bin(1024).await;
        let app = router().with_state(state);
        let request = Request::builder()
            .method("POST")
            .uri("/b/b_hooks/webhook?source=github&source=gitlab")
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .body(Body::from(r#"{"a": 1}"#))
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["event_id"], "e_000001");

        let stored = events.stored_events();
        assert_eq!(stored.len(), 1);
        let event = &stored[0];
        assert_eq!(event.method, "POST");
        assert_eq!(event.path, "/webhook");
        assert_eq!(event.query_params["source"], "gitlab");
        assert_eq!(event.headers["content-type"], "application/json");
        assert_eq!(event.remote_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(event.body, br#"{"a": 1}"#);
        assert_eq!(event.size_bytes, 8);
    }

    #[tokio::test]
    async fn test_ingest_at_bin_root_captures_slash_path() {
        // Arrange
        let (state, events) = state_with_bin(1024).await;
        let app = router().with_state(state);
        let request = Request::builder()
            .method("GET")
            .uri("/b/b_hooks")
            .body(Body::empty())
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let stored = events.stored_events();
        assert_eq!(stored[0].path, "/");
        assert_eq!(stored[0].size_bytes, 0);
        assert!(stored[0].remote_ip.is_none());
    }

    #[tokio::test]
    async fn test_ingest_uses_peer_address_without_forwarded_header() {
        // Arrange
        let (state, events) = state_with_bin(1024).await;
        let app = router().with_state(state);
        let mut request = Request::builder()
            .method("PUT")
            .uri("/b/b_hooks/x")
            .body(Body::empty())
            .unwrap();
        let peer: SocketAddr = "198.51.100.4:51000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            events.stored_events()[0].remote_ip.as_deref(),
            Some("198.51.100.4")
        );
    }

    #[tokio::test]
    async fn test_ingest_into_unknown_bin_returns_404() {
        // Arrange
        let (state, events) = state_with_bin(1024).await;
        let app = router().with_state(state);
        let request = Request::builder()
            .method("POST")
            .uri("/b/b_missing/webhook")
            .body(Body::from("x"))
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "bin_not_found");
        assert!(events.stored_events().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_rejects_oversized_body_from_content_length() {
        // Arrange
        let (state, events) = state_with_bin(16).await;
        let app = router().with_state(state);
        let request = Request::builder()
            .method("POST")
            .uri("/b/b_hooks/big")
            .header("content-length", "17")
            .body(Body::from(vec![b'x'; 17]))
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_body(response).await;
        assert_eq!(json["error"], "payload_too_large");
        assert!(events.stored_events().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_to_unknown_bin_returns_404() {
        // Arrange
        let (state, events) = state_with_bin(16).await;
        let app = router().with_state(state);
        let request = Request::builder()
            .method("POST")
            .uri("/b/b_missing/x")
            .header("content-length", "64")
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"], "bin_not_found");
        assert!(events.stored_events().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_replaces_nul_in_query_values() {
        // Arrange
        let (state, events) = state_with_bin(1024).await;
        let app = router().with_state(state);
        let request = Request::builder()
            .method("GET")
            .uri("/b/b_hooks/x?a=%00")
            .body(Body::empty())
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(events.stored_events()[0].query_params["a"], "\u{FFFD}");
    }

    #[tokio::test]
    async fn test_ingest_rejects_oversized_streamed_body() {
        // Arrange
        let (state, events) = state_with_bin(16).await;
        let app = router().with_state(state);
        let chunks: Vec<Result<&'static [u8], std::io::Error>> =
            vec![Ok(&b"0123456789"[..]), Ok(&b"0123456789"[..])];
        let body = Body::from_stream(futures_util::stream::iter(chunks));
        let request = Request::builder()
            .method("POST")
            .uri("/b/b_hooks/stream")
            .body(body)
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(events.stored_events().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_accepts_body_exactly_at_limit() {
        // Arrange
        let (state, events) = state_with_bin(16).await;
        let app = router().with_state(state);
        let request = Request::builder()
            .method("POST")
            .uri("/b/b_hooks/edge")
            .body(Body::from(vec![b'x'; 16]))
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(events.stored_events()[0].size_bytes, 16);
    }

    #[tokio::test]
    async fn test_ingest_returns_503_when_store_unavailable() {
        // Arrange
        let state = state_with(
            Arc::new(FailingBinRepository),
            Arc::new(FailingEventRepository),
            1024,
        );
        let app = router().with_state(state);
        let request = Request::builder()
            .method("POST")
            .uri("/b/b_hooks")
            .body(Body::empty())
            .unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
