// SPDX-License-Identifier: MIT

//! Goal store: validation and persistence of user-owned goals.

use crate::db::Db;
use crate::error::AppError;
use crate::models::{Goal, GoalType, NewGoal};
use chrono::NaiveDate;

/// Validates and persists goal records.
#[derive(Clone)]
pub struct GoalService {
    db: Db,
}

impl GoalService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Validate and persist a new goal owned by `owner_id`.
    ///
    /// Field constraints are checked before any write: the title must be
    /// non-empty after trimming, the type must be a recognized category,
    /// and the deadline (when given) must parse as a calendar date. One
    /// durable write, no retries; a failed write is reported to the caller.
    pub async fn create_goal(&self, owner_id: i64, fields: NewGoal) -> Result<Goal, AppError> {
        let title = fields.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }

        let goal_type = GoalType::parse(&fields.goal_type).ok_or_else(|| {
            AppError::Validation(format!("unrecognized goal type: {:?}", fields.goal_type))
        })?;

        let deadline = fields
            .deadline
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_deadline)
            .transpose()?;

        let goal = self
            .db
            .insert_goal(
                owner_id,
                title,
                fields.description.as_deref(),
                goal_type,
                deadline,
            )
            .await?;

        tracing::info!(goal_id = goal.id, owner_id, "Goal created");

        Ok(goal)
    }

    /// All goals owned by a user, in creation order. Empty when the owner
    /// has none; never an error for an empty result.
    pub async fn list_goals(&self, owner_id: i64) -> Result<Vec<Goal>, AppError> {
        self.db.get_goals_for_user(owner_id).await
    }
}

/// Parse an ISO `YYYY-MM-DD` deadline into a normalized calendar date.
fn parse_deadline(raw: &str) -> Result<NaiveDate, AppError> {
    raw.parse::<NaiveDate>().map_err(|_| {
        AppError::Validation(format!("invalid deadline, expected YYYY-MM-DD: {raw:?}"))
    })
}
