// SPDX-License-Identifier: MIT

//! Session authentication middleware.

use crate::error::AppError;
use crate::services::identity::{Caller, CallerIdentity};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Session cookie name set by the identity provider's frontend SDK.
const SESSION_COOKIE: &str = "__session";

/// Authenticated caller extracted from a verified session token.
#[derive(Debug, Clone)]
pub struct AuthCaller {
    pub external_id: String,
    pub email: String,
}

/// Middleware that requires a verified identity.
///
/// Rejection happens here, before the handler runs, so an unauthenticated
/// request never reaches the store.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        Some(cookie.value().to_string())
    } else {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    };

    match state.identity.current_caller(token.as_deref()).await {
        Caller::Authenticated(CallerIdentity { external_id, email }) => {
            request
                .extensions_mut()
                .insert(AuthCaller { external_id, email });
            Ok(next.run(request).await)
        }
        Caller::Anonymous => Err(AppError::Unauthorized),
    }
}
