//! Integration tests for songlib-api endpoints that need no database
//!
//! The router runs against a lazily connecting pool pointed at a closed port,
//! so every request here must be answered before the store is touched, or
//! fail with a database error.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use songlib_api::{build_router, services::SongInfoClient, AppState};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tower::util::ServiceExt; // for `oneshot` method

/// Pool that never connects successfully
fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(300))
        .connect_lazy_with(
            PgConnectOptions::new()
                .host("127.0.0.1")
                .port(1)
                .username("songlib")
                .database("songlib"),
        )
}

/// Test helper: app whose provider and database are both unreachable
fn setup_app() -> axum::Router {
    let song_info = SongInfoClient::new("http://127.0.0.1:1/info", Duration::from_secs(2))
        .expect("Should build song info client");
    build_router(AppState::new(unreachable_pool(), song_info))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Send a request expected to fail; returns the error code and message
async fn expect_error(request: Request<Body>, status: StatusCode) -> (String, String) {
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), status);

    let body = extract_json(response.into_body()).await;
    (
        body["error"]["code"].as_str().unwrap_or_default().to_string(),
        body["error"]["message"].as_str().unwrap_or_default().to_string(),
    )
}

// =============================================================================
// Health and sample provider
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = setup_app().oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "songlib-api");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_info_returns_song_detail() {
    let response = setup_app()
        .oneshot(test_request("GET", "/info?group=Muse&song=Supermassive%20Black%20Hole"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["releaseDate"], "16.07.2006");
    assert!(body["text"].as_str().unwrap().contains('\n'));
    assert!(body["link"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn test_info_requires_group_and_song() {
    let (code, message) =
        expect_error(test_request("GET", "/info?song=Uprising"), StatusCode::BAD_REQUEST).await;
    assert_eq!(code, "BAD_REQUEST");
    assert!(message.contains("group"));

    let (_, message) =
        expect_error(test_request("GET", "/info?group=Muse&song="), StatusCode::BAD_REQUEST).await;
    assert!(message.contains("song"));
}

// =============================================================================
// POST /music
// =============================================================================

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let (code, message) =
        expect_error(json_request("POST", "/music", "{not json"), StatusCode::BAD_REQUEST).await;
    assert_eq!(code, "BAD_REQUEST");
    assert!(message.starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_create_requires_group_and_song() {
    for body in [json!({ "group": "Muse" }), json!({ "group": "", "song": "Uprising" })] {
        expect_error(json_request("POST", "/music", body.to_string()), StatusCode::BAD_REQUEST)
            .await;
    }
}

#[tokio::test]
async fn test_create_with_unreachable_provider_is_server_error() {
    let body = json!({ "group": "Muse", "song": "Uprising" }).to_string();
    let (code, _) =
        expect_error(json_request("POST", "/music", body), StatusCode::INTERNAL_SERVER_ERROR).await;
    assert_eq!(code, "SONG_INFO_ERROR");
}

// =============================================================================
// GET /music/:id/text
// =============================================================================

#[tokio::test]
async fn test_text_requires_page() {
    let (_, message) =
        expect_error(test_request("GET", "/music/1/text"), StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Page parameter is required");
}

#[tokio::test]
async fn test_text_rejects_bad_page() {
    for uri in ["/music/1/text?page=0", "/music/1/text?page=-2", "/music/1/text?page=abc"] {
        expect_error(test_request("GET", uri), StatusCode::BAD_REQUEST).await;
    }
}

#[tokio::test]
async fn test_text_rejects_bad_song_id() {
    for uri in ["/music/abc/text?page=1", "/music/0/text?page=1"] {
        expect_error(test_request("GET", uri), StatusCode::BAD_REQUEST).await;
    }
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let (code, _) = expect_error(
        test_request("GET", "/music/1/text?page=1"),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .await;
    assert_eq!(code, "DATABASE_ERROR");
}

// =============================================================================
// PUT /music/:id and DELETE /music/:id
// =============================================================================

#[tokio::test]
async fn test_update_rejects_bad_date_before_store() {
    let body = json!({ "name": "Renamed", "release_date": "16.07.2006" }).to_string();
    let (_, message) =
        expect_error(json_request("PUT", "/music/1", body), StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Invalid date format. Use YYYY-MM-DD");
}

#[tokio::test]
async fn test_update_rejects_unknown_field() {
    let body = json!({ "artist": "Muse" }).to_string();
    let (_, message) =
        expect_error(json_request("PUT", "/music/1", body), StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Unknown field 'artist'");
}

#[tokio::test]
async fn test_update_rejects_malformed_json_and_bad_id() {
    expect_error(json_request("PUT", "/music/1", "[1,"), StatusCode::BAD_REQUEST).await;
    expect_error(
        json_request("PUT", "/music/-1", json!({ "text": "x" }).to_string()),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn test_delete_rejects_bad_id() {
    expect_error(test_request("DELETE", "/music/abc"), StatusCode::BAD_REQUEST).await;
}

// =============================================================================
// GET /songs
// =============================================================================

#[tokio::test]
async fn test_undecodable_query_uses_error_envelope() {
    for uri in [
        "/songs?name=a&name=b",
        "/music/1/text?page=1&page=2",
        "/info?group=Muse&group=Queen&song=Uprising",
    ] {
        let (code, message) = expect_error(test_request("GET", uri), StatusCode::BAD_REQUEST).await;
        assert_eq!(code, "BAD_REQUEST", "{}", uri);
        assert!(!message.is_empty(), "{}", uri);
    }
}

#[tokio::test]
async fn test_songs_rejects_bad_release_date() {
    let (_, message) = expect_error(
        test_request("GET", "/songs?release_date=16.07.2006"),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Invalid date format. Use YYYY-MM-DD");
}
