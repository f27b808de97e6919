// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization middleware tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without a session cookie or with a
//!    token the provider rejects, without running the handler
//! 2. Accepted tokens resolve to the directory's user, created on first sight
//! 3. The login routes and health check stay reachable without a session

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;
use timetracker::services::IdentityProvider;

mod common;
use common::{
    body_json, create_test_app, create_test_app_with_config, get_request, StubProvider,
    FIRST_USER_ID,
};
use timetracker::config::{Config, HostingEnv};

#[tokio::test]
async fn test_protected_route_without_cookie() {
    let app = create_test_app(StubProvider::new().with_token("tok-1", "alice"));

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/test/protected", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no_token");

    // Never reached the handler or the provider
    assert_eq!(app.handler_calls(), 0);
    assert_eq!(app.provider.check_count(), 0);
}

#[tokio::test]
async fn test_every_protected_route_requires_session() {
    let app = create_test_app(StubProvider::new());

    for uri in [
        "/api/user",
        "/api/auth/isAuthenticated",
        "/api/github/search?query=rust",
        "/api/github/repo/octocat/hello-world/branches",
        "/api/github/repo/octocat/hello-world/commits",
    ] {
        let response = app
            .router
            .clone()
            .oneshot(get_request(uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_protected_route_with_rejected_token() {
    let app = create_test_app(StubProvider::new().with_token("tok-1", "alice"));

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/test/protected", Some("revoked-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid_token");
    assert_eq!(app.handler_calls(), 0);
    assert_eq!(app.provider.check_count(), 1);
    assert!(app.db.is_empty());
}

#[tokio::test]
async fn test_malformed_cookie_is_no_token() {
    let app = create_test_app(StubProvider::new());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/test/protected")
                .header(header::COOKIE, "LoginData=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.provider.check_count(), 0);
}

#[tokio::test]
async fn test_valid_token_creates_user_on_first_sight() {
    let app = create_test_app(StubProvider::new().with_token("tok-1", "alice"));

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/test/protected", Some("tok-1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.handler_calls(), 1);

    let expected = app.state.directory.get_local_id("alice").await.unwrap();
    assert_eq!(expected, FIRST_USER_ID);
    assert_eq!(common::body_text(response).await, expected.to_string());
}

#[tokio::test]
async fn test_valid_token_resolves_existing_user() {
    let app = create_test_app(
        StubProvider::new()
            .with_token("tok-1", "alice")
            .with_token("tok-2", "bob"),
    );

    // Bob already has an account
    let bob_identity = app
        .provider
        .check_token(&timetracker::cookie::SessionToken::parse("tok-2").unwrap())
        .await
        .unwrap();
    let bob = app.state.directory.create(&bob_identity).await.unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/user", Some("tok-2")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], bob.id);
    assert_eq!(body["githubUserId"], "bob");
    assert_eq!(app.db.len(), 1);
}

#[tokio::test]
async fn test_repeated_resolution_is_idempotent() {
    let app = create_test_app(StubProvider::new().with_token("tok-1", "alice"));

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(get_request("/api/user", Some("tok-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        ids.push(body_json(response).await["id"].as_u64().unwrap());
    }

    assert_eq!(ids, vec![FIRST_USER_ID, FIRST_USER_ID]);
    assert_eq!(app.db.len(), 1);
    // No cache by default: both requests went to the provider
    assert_eq!(app.provider.check_count(), 2);
}

#[tokio::test]
async fn test_is_authenticated() {
    let app = create_test_app(StubProvider::new().with_token("tok-1", "alice"));

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/auth/isAuthenticated", Some("tok-1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "data": true }));
}

#[tokio::test]
async fn test_login_url_is_public() {
    let app = create_test_app(StubProvider::new());

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/github/url", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]
        .as_str()
        .unwrap()
        .starts_with("https://github.example/login/oauth/authorize"));
    assert_eq!(app.provider.check_count(), 0);
}

#[tokio::test]
async fn test_empty_search_skips_github() {
    let app = create_test_app(StubProvider::new().with_token("tok-1", "alice"));

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/github/search?query=", Some("tok-1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "data": [] }));
}

#[tokio::test]
async fn test_security_headers_on_rejection() {
    let app = create_test_app(StubProvider::new());

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/user", None))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
    assert!(headers.contains_key("Strict-Transport-Security"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = create_test_app(StubProvider::new());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/user")
                .header(header::ORIGIN, "http://localhost:4200")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Preflight is answered before authentication
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/user")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_rejects_lookalike_localhost_origin() {
    let mut config = Config::test_default();
    config.hosting_env = HostingEnv::Development;
    let app = create_test_app_with_config(config, StubProvider::new());

    for origin in ["http://localhost.evil.example", "http://127.0.0.1.evil.example:4200"] {
        let response = app.router.clone().oneshot(preflight(origin)).await.unwrap();
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            "{} was allowed",
            origin
        );
    }

    // A real loopback dev server is still allowed in Development
    let response = app
        .router
        .clone()
        .oneshot(preflight("http://localhost:5173"))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_cors_loopback_not_allowed_when_deployed() {
    let mut config = Config::test_default();
    config.frontend_url = "https://tracker.example.com".to_string();
    let app = create_test_app_with_config(config, StubProvider::new());

    let response = app
        .router
        .clone()
        .oneshot(preflight("http://localhost:4200"))
        .await
        .unwrap();
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let response = app
        .router
        .clone()
        .oneshot(preflight("https://tracker.example.com"))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://tracker.example.com"
    );
}
