//! End-to-end requests through the router, exercising the gateway middleware
//! wiring and the wire-level statuses and envelopes.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use bookline_server::db::Database;
use bookline_server::gateway::{hash_key, API_KEY_HEADER};
use bookline_server::http::{build_router, AppState};
use bookline_server::webhook::WebhookSender;

const KEY: &str = "test-key";

async fn setup_app(rate_limit: i64) -> (Database, Router) {
    let db = Database::open_in_memory().await.unwrap();
    db.create_host("h1", "Ada", "UTC", 30, 0).await.unwrap();
    db.create_api_client("c1", "Test client", &hash_key(KEY), rate_limit, None, None)
        .await
        .unwrap();

    let app = build_router(AppState {
        db: db.clone(),
        webhooks: WebhookSender::new(Duration::from_secs(1)),
    });
    (db, app)
}

fn post_json(uri: &str, key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header(API_KEY_HEADER, key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn slots_request() -> Value {
    json!({"host_id": "h1", "date": "2026-03-02"})
}

fn booking_request(start: &str, end: &str) -> Value {
    json!({
        "host_id": "h1",
        "guest_name": "Ada Lovelace",
        "guest_email": "ada@example.com",
        "start_time": start,
        "end_time": end,
    })
}

#[tokio::test]
async fn health_is_open_without_a_key() {
    let (_db, app) = setup_app(100).await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_key_is_rejected_with_401() {
    let (_db, app) = setup_app(100).await;

    let response = app
        .oneshot(post_json("/api/availability/slots", Some("wrong"), slots_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn missing_key_is_rejected_with_401() {
    let (_db, app) = setup_app(100).await;

    let response = app
        .oneshot(post_json("/api/availability/slots", None, slots_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_roundtrip_over_the_wire() {
    let (_db, app) = setup_app(100).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/bookings",
            Some(KEY),
            booking_request("2026-03-02T10:00:00Z", "2026-03-02T10:30:00Z"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["status"], "confirmed");
    assert_eq!(created["guest_email"], "ada@example.com");
    assert_eq!(created["start_time"], "2026-03-02T10:00:00+00:00");

    // The same range over the wire loses with the conflict status and code.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/bookings",
            Some(KEY),
            booking_request("2026-03-02T10:00:00Z", "2026-03-02T10:30:00Z"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"], "slot_unavailable");

    // The listing envelope carries the single confirmed booking.
    let response = app
        .oneshot(
            Request::get("/api/bookings?host_id=h1")
                .header(API_KEY_HEADER, KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let envelope = json_body(response).await;
    assert_eq!(envelope["count"], 1);
    assert_eq!(envelope["data"][0]["guest_name"], "Ada Lovelace");
}

#[tokio::test]
async fn malformed_timestamp_is_a_400() {
    let (_db, app) = setup_app(100).await;

    let response = app
        .oneshot(post_json(
            "/api/bookings",
            Some(KEY),
            booking_request("tomorrow-ish", "2026-03-02T10:30:00Z"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn exhausted_quota_is_a_429() {
    let (_db, app) = setup_app(1).await;

    // The first routed call consumes the whole quota.
    let response = app
        .clone()
        .oneshot(post_json("/api/availability/slots", Some(KEY), slots_request()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json("/api/availability/slots", Some(KEY), slots_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert_eq!(body["error"], "rate_limited");
}
