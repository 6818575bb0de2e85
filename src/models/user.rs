//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal user record mapped from an identity-provider subject.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Internal id (primary key)
    pub id: i64,
    /// Identity provider subject id; unique, immutable after creation
    pub external_id: String,
    /// Email address at account-creation time (may go stale vs the provider)
    pub email: String,
    /// When the record was first created
    pub created_at: DateTime<Utc>,
}
