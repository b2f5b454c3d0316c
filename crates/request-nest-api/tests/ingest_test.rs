//! Integration tests for the public ingest surface.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_webhook_capture_appears_in_event_list(pool: PgPool) {
    let bin_id = common::create_bin(common::build_test_app(pool.clone()), "hooks").await;

    let (status, ack) = common::ingest(
        common::build_test_app(pool.clone()),
        "POST",
        &format!("/b/{bin_id}/webhook"),
        &[("content-type", "application/json")],
        r#"{"a": 1}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["ok"], true);
    assert!(ack["event_id"].as_str().unwrap().starts_with("e_"));

    let (status, json) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/bins/{bin_id}/events"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let events = json["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], ack["event_id"]);
    assert_eq!(events[0]["method"], "POST");
    assert_eq!(events[0]["path"], "/webhook");
    assert_eq!(events[0]["size_bytes"], 8);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ingest_into_unknown_bin_returns_404_and_stores_nothing(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let (status, json) = common::ingest(app, "POST", "/b/b_nope/hook", &[], "payload").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "bin_not_found");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_oversized_body_returns_413_and_stores_nothing(pool: PgPool) {
    let bin_id = common::create_bin(common::build_test_app(pool.clone()), "big").await;

    let (status, json) = common::ingest(
        common::build_test_app(pool.clone()),
        "PUT",
        &format!("/b/{bin_id}/upload"),
        &[],
        vec![b'x'; common::MAX_BODY_SIZE + 1],
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "payload_too_large");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_concurrent_ingests_store_distinct_events(pool: PgPool) {
    let bin_id = common::create_bin(common::build_test_app(pool.clone()), "busy").await;
    let uri = format!("/b/{bin_id}/hit");

    let ((status_a, ack_a), (status_b, ack_b)) = tokio::join!(
        common::ingest(common::build_test_app(pool.clone()), "POST", &uri, &[], "a"),
        common::ingest(common::build_test_app(pool.clone()), "POST", &uri, &[], "b"),
    );

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_ne!(ack_a["event_id"], ack_b["event_id"]);

    let (_, json) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/bins/{bin_id}/events"),
    )
    .await;
    assert_eq!(json["events"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_ingest_at_bin_root_accepts_any_method(pool: PgPool) {
    let bin_id = common::create_bin(common::build_test_app(pool.clone()), "root").await;

    let (status, _) = common::ingest(
        common::build_test_app(pool.clone()),
        "DELETE",
        &format!("/b/{bin_id}"),
        &[],
        "",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let (_, json) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/bins/{bin_id}/events"),
    )
    .await;
    assert_eq!(json["events"][0]["method"], "DELETE");
    assert_eq!(json["events"][0]["path"], "/");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_oversized_body_to_unknown_bin_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let (status, json) = common::ingest(
        app,
        "POST",
        "/b/b_missing/upload",
        &[],
        vec![b'x'; common::MAX_BODY_SIZE + 1],
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "bin_not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_nul_in_query_value_is_captured(pool: PgPool) {
    let bin_id = common::create_bin(common::build_test_app(pool.clone()), "nul").await;

    let (status, ack) = common::ingest(
        common::build_test_app(pool.clone()),
        "GET",
        &format!("/b/{bin_id}/x?a=%00&b=ok"),
        &[],
        "",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let event_id = ack["event_id"].as_str().unwrap();
    let (status, json) = common::get_json(
        common::build_test_app(pool),
        &format!("/api/events/{event_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query_params"]["a"], "\u{FFFD}");
    assert_eq!(json["query_params"]["b"], "ok");
}
