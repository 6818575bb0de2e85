// SPDX-License-Identifier: MIT

//! Authentication boundary tests.
//!
//! These tests verify that:
//! 1. Requests without a resolvable identity are rejected before any
//!    store access (the offline mock database would turn a store call
//!    into a 500, so a clean 401 proves none happened)
//! 2. Both bearer-header and session-cookie tokens are accepted
//! 3. Public routes and CORS preflight work without auth

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

use common::StubIdentityProvider;

#[tokio::test]
async fn test_create_goal_without_token_is_unauthorized() {
    let (app, _state) = common::create_test_app_offline(Arc::new(StubIdentityProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/goals")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"title": "Run 5k", "type": "SHORT_TERM"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_create_goal_with_unknown_token_is_unauthorized() {
    let (app, _state) = common::create_test_app_offline(Arc::new(StubIdentityProvider::new()));

    let response = app
        .oneshot(common::post_goal_request(
            "stale-or-forged-token",
            json!({"title": "Run 5k", "type": "SHORT_TERM"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_list_goals_without_token_is_unauthorized() {
    let (app, _state) = common::create_test_app_offline(Arc::new(StubIdentityProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/goals")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let identity = Arc::new(
        StubIdentityProvider::new().with_caller("cookie-token", "ext-carol", "carol@example.com"),
    );
    let (app, _state) = common::create_test_app(identity).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/goals")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, "__session=cookie-token")
                .body(Body::from(
                    json!({"title": "Run 5k", "type": "SHORT_TERM"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_empty_bearer_token_is_unauthorized() {
    let (app, _state) = common::create_test_app_offline(Arc::new(StubIdentityProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/goals")
                .header(header::AUTHORIZATION, "Bearer ")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_requires_no_auth() {
    let (app, _state) = common::create_test_app_offline(Arc::new(StubIdentityProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _state) = common::create_test_app_offline(Arc::new(StubIdentityProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/goals")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _state) = common::create_test_app_offline(Arc::new(StubIdentityProvider::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
}
