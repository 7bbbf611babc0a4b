//! Web API Authentication Tests
//!
//! Integration tests for /connect, /disconnect and token checks.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use common::{basic_auth, with_token, TestApp, PASSWORD};
use serde_json::{json, Value};

// ============================================================================
// Connect
// ============================================================================

#[tokio::test]
async fn test_connect_success() {
    let app = TestApp::new().await;
    app.create_user("bob@dylan.com").await;

    let response = app
        .server
        .get("/connect")
        .add_header(AUTHORIZATION, basic_auth("bob@dylan.com", PASSWORD))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_connect_twice_gives_distinct_tokens() {
    let app = TestApp::new().await;
    app.create_user("bob@dylan.com").await;

    let first = app.connect("bob@dylan.com").await;
    let second = app.connect("bob@dylan.com").await;
    assert_ne!(first, second);

    for token in [&first, &second] {
        with_token(app.server.get("/files"), token)
            .await
            .assert_status_ok();
    }
}

#[tokio::test]
async fn test_connect_wrong_password() {
    let app = TestApp::new().await;
    app.create_user("bob@dylan.com").await;

    let response = app
        .server
        .get("/connect")
        .add_header(AUTHORIZATION, basic_auth("bob@dylan.com", "wrong-password"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn test_connect_unknown_user_looks_like_wrong_password() {
    let app = TestApp::new().await;
    app.create_user("bob@dylan.com").await;

    let unknown = app
        .server
        .get("/connect")
        .add_header(AUTHORIZATION, basic_auth("nobody@dylan.com", PASSWORD))
        .await;
    let wrong = app
        .server
        .get("/connect")
        .add_header(AUTHORIZATION, basic_auth("bob@dylan.com", "nope-nope"))
        .await;

    unknown.assert_status(StatusCode::UNAUTHORIZED);
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.json::<Value>(), wrong.json::<Value>());
}

#[tokio::test]
async fn test_connect_malformed_headers() {
    let app = TestApp::new().await;
    app.create_user("bob@dylan.com").await;

    app.server
        .get("/connect")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    for header in [
        "Bearer abc".to_string(),
        "Basic !!!not-base64!!!".to_string(),
        // "bob@dylan.com" without a colon
        "Basic Ym9iQGR5bGFuLmNvbQ==".to_string(),
    ] {
        app.server
            .get("/connect")
            .add_header(AUTHORIZATION, header)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

// ============================================================================
// Disconnect
// ============================================================================

#[tokio::test]
async fn test_disconnect_revokes_token() {
    let app = TestApp::new().await;
    let (_, token) = app.login("bob@dylan.com").await;

    let response = with_token(app.server.get("/disconnect"), &token).await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.as_bytes().is_empty());

    with_token(app.server.get("/files"), &token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    with_token(app.server.get("/disconnect"), &token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disconnect_leaves_other_sessions() {
    let app = TestApp::new().await;
    let (_, first) = app.login("bob@dylan.com").await;
    let second = app.connect("bob@dylan.com").await;

    with_token(app.server.get("/disconnect"), &first)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    with_token(app.server.get("/files"), &second)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_disconnect_without_token() {
    let app = TestApp::new().await;

    app.server
        .get("/disconnect")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    with_token(app.server.get("/disconnect"), "never-issued")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Token checks
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    app.server
        .get("/files")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get("/files/1")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post("/files")
        .json(&json!({"name": "a", "type": "folder"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .put("/files/1/publish")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .put("/files/1/unpublish")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    with_token(app.server.get("/files"), "bogus")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_expires_after_24_hours() {
    let app = TestApp::new().await;
    let (_, token) = app.login("bob@dylan.com").await;

    app.clock
        .advance(chrono::Duration::hours(23) + chrono::Duration::minutes(59));
    with_token(app.server.get("/files"), &token)
        .await
        .assert_status_ok();

    app.clock.advance(chrono::Duration::minutes(1));
    with_token(app.server.get("/files"), &token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cache_outage_is_a_server_error() {
    let app = TestApp::with_cache_down().await;
    app.create_user("bob@dylan.com").await;

    let response = app
        .server
        .get("/connect")
        .add_header(AUTHORIZATION, basic_auth("bob@dylan.com", PASSWORD))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"error": "Internal server error"}));

    // A token that cannot be checked is not reported as a bad token
    for request in [
        app.server.get("/files"),
        app.server.get("/files/1"),
        app.server.get("/disconnect"),
    ] {
        with_token(request, "some-token")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}
