// SPDX-License-Identifier: MIT

//! Goal model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Goal category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalType {
    ShortTerm,
    LongTerm,
}

impl GoalType {
    /// Parse a wire-format category string. Returns `None` for anything
    /// unrecognized; callers must not default silently.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "SHORT_TERM" => Some(Self::ShortTerm),
            "LONG_TERM" => Some(Self::LongTerm),
            _ => None,
        }
    }
}

/// Stored goal record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Goal {
    /// Goal id (primary key)
    pub id: i64,
    /// Owning user's internal id
    pub owner_id: i64,
    /// Goal title (non-empty, trimmed)
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Category
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    /// Optional deadline, normalized to a calendar date
    pub deadline: Option<NaiveDate>,
    /// When the goal was created
    pub created_at: DateTime<Utc>,
}

/// Unvalidated goal fields as parsed from a request payload.
///
/// Missing `title`/`type` deserialize to empty strings so that presence
/// checks happen in the store layer alongside the other field constraints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGoal {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub goal_type: String,
    pub deadline: Option<String>,
}
