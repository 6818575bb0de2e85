// SPDX-License-Identifier: MIT

//! Goal ingestion and listing routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthCaller;
use crate::models::{Goal, NewGoal};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Extension, Json, Router};
use std::sync::Arc;

/// Goal routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/goals", post(create_goal).get(list_goals))
}

/// Create a goal for the authenticated caller.
///
/// Resolves the caller's user record (creating it on first sight), then
/// validates and persists the goal. Everything past authentication
/// collapses into one generic failure response; the specific cause is
/// logged server-side and never surfaced to the caller.
async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthCaller>,
    Json(fields): Json<NewGoal>,
) -> Result<(StatusCode, Json<Goal>)> {
    let user = match state
        .directory
        .ensure_user(&caller.external_id, &caller.email)
        .await
    {
        Ok(user) => user,
        Err(err) => {
            tracing::error!(
                error = %err,
                external_id = %caller.external_id,
                "User resolution failed"
            );
            return Err(AppError::GoalCreationFailed);
        }
    };

    match state.goals.create_goal(user.id, fields).await {
        Ok(goal) => Ok((StatusCode::CREATED, Json(goal))),
        Err(err) => {
            tracing::error!(error = %err, owner_id = user.id, "Goal creation failed");
            Err(AppError::GoalCreationFailed)
        }
    }
}

/// List the caller's goals in creation order.
///
/// A caller whose identity has never triggered a write has no user row
/// yet; that is an empty list, not an error, and the listing itself never
/// creates one.
async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthCaller>,
) -> Result<Json<Vec<Goal>>> {
    let Some(user) = state.directory.find_user(&caller.external_id).await? else {
        return Ok(Json(Vec::new()));
    };

    let goals = state.goals.list_goals(user.id).await?;

    tracing::debug!(
        owner_id = user.id,
        count = goals.len(),
        "Fetched goals"
    );

    Ok(Json(goals))
}
