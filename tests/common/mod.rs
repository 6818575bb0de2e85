// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use goaltrack_api::config::Config;
use goaltrack_api::db::Db;
use goaltrack_api::routes::create_router;
use goaltrack_api::services::identity::{Caller, CallerIdentity, IdentityProvider};
use goaltrack_api::services::{GoalService, UserDirectory};
use goaltrack_api::AppState;
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Identity provider stub: a fixed mapping from session token to caller.
/// Unknown or missing tokens resolve to Anonymous.
#[allow(dead_code)]
pub struct StubIdentityProvider {
    callers: HashMap<String, CallerIdentity>,
}

impl StubIdentityProvider {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            callers: HashMap::new(),
        }
    }

    #[allow(dead_code)]
    pub fn with_caller(mut self, token: &str, external_id: &str, email: &str) -> Self {
        self.callers.insert(
            token.to_string(),
            CallerIdentity {
                external_id: external_id.to_string(),
                email: email.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn current_caller(&self, session_token: Option<&str>) -> Caller {
        session_token
            .and_then(|token| self.callers.get(token))
            .cloned()
            .map(Caller::Authenticated)
            .unwrap_or(Caller::Anonymous)
    }
}

static NEXT_DB_ID: AtomicU32 = AtomicU32::new(0);

/// Create a fresh file-backed test database with migrations applied.
///
/// A file (rather than `:memory:`) so every pooled connection sees the
/// same schema and concurrent writers contend on the real constraint.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    let id = NEXT_DB_ID.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
        "goaltrack_test_{}_{}.db",
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_file(&path);

    let url = format!("sqlite://{}", path.display());
    Db::connect(&url)
        .await
        .expect("Failed to open test database")
}

/// Create a test app over a fresh database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app(
    identity: Arc<dyn IdentityProvider>,
) -> (axum::Router, Arc<AppState>) {
    let db = test_db().await;
    build_app(db, identity)
}

/// Create a test app with an offline mock database: any store access
/// fails, so a clean rejection doubles as a zero-store-calls assertion.
#[allow(dead_code)]
pub fn create_test_app_offline(
    identity: Arc<dyn IdentityProvider>,
) -> (axum::Router, Arc<AppState>) {
    build_app(Db::new_mock(), identity)
}

#[allow(dead_code)]
fn build_app(db: Db, identity: Arc<dyn IdentityProvider>) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        directory: UserDirectory::new(db.clone()),
        goals: GoalService::new(db.clone()),
        db,
        identity,
    });

    (create_router(state.clone()), state)
}

/// Build a POST /goals request carrying a session bearer token.
#[allow(dead_code)]
pub fn post_goal_request(token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/goals")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a GET /goals request carrying a session bearer token.
#[allow(dead_code)]
pub fn list_goals_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/goals")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Response body should be JSON")
}
