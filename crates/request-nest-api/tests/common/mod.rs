//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use request_nest_api::build_router;
use request_nest_api::config::ApiSettings;
use request_nest_api::state::AppState;
use request_nest_capture::domain::capture::CaptureLimits;
use sqlx::PgPool;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "integration-token";
pub const BASE_URL: &str = "http://nest.test";
pub const MAX_BODY_SIZE: usize = 4096;

/// Build the full app router over real `PostgreSQL` repositories, wired the
/// same way as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let settings = ApiSettings {
        base_url: BASE_URL.to_owned(),
        admin_token: ADMIN_TOKEN.to_owned(),
        capture_limits: CaptureLimits {
            max_body_size: MAX_BODY_SIZE,
        },
        db_timeout: Duration::from_secs(5),
    };
    build_router(AppState::with_postgres(pool, settings))
}

/// Send a request and return the status with the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send an authenticated Admin API POST with a JSON body.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send an authenticated Admin API GET.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send an unauthenticated request to the ingest surface.
pub async fn ingest(
    app: Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: impl Into<Body>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(body.into()).unwrap()).await
}

/// Create a bin through the Admin API and return its ID.
pub async fn create_bin(app: Router, name: &str) -> String {
    let (status, json) = post_json(app, "/api/bins", &serde_json::json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_owned()
}
