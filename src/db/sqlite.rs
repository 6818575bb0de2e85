// SPDX-License-Identifier: MIT

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (identity-to-account mapping)
//! - Goals (user-owned goal records)
//!
//! Schema invariants live in the migrations: `users.external_id` carries a
//! UNIQUE constraint and `goals.owner_id` a foreign key to `users.id`.

use crate::error::AppError;
use crate::models::{Goal, GoalType, User};
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const MAX_CONNECTIONS: u32 = 5;

/// Embedded schema migrations, applied at connect time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// SQLite database client.
#[derive(Clone)]
pub struct Db {
    pool: Option<SqlitePool>,
}

impl Db {
    /// Open the database, creating the file if needed, and apply pending
    /// migrations. Foreign key enforcement is switched on per connection.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        tracing::info!(url = database_url, "Connected to database");

        Ok(Self { pool: Some(pool) })
    }

    /// Create a mock database client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Helper to get the pool or return an error if offline.
    fn get_pool(&self) -> Result<&SqlitePool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by the identity provider's subject id.
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, external_id, email, created_at
             FROM users WHERE external_id = ?",
        )
        .bind(external_id)
        .fetch_optional(self.get_pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new user row.
    ///
    /// Returns `None` when another writer already mapped this external id;
    /// the UNIQUE constraint settles the race and the caller re-reads the
    /// winning row.
    pub async fn insert_user(
        &self,
        external_id: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (external_id, email, created_at)
             VALUES (?, ?, ?)
             ON CONFLICT(external_id) DO NOTHING
             RETURNING id, external_id, email, created_at",
        )
        .bind(external_id)
        .bind(email)
        .bind(Utc::now())
        .fetch_optional(self.get_pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Goal Operations ─────────────────────────────────────────

    /// Insert a goal row with already-validated fields.
    ///
    /// The owner linkage is checked by the foreign key; a dangling
    /// `owner_id` fails the write.
    pub async fn insert_goal(
        &self,
        owner_id: i64,
        title: &str,
        description: Option<&str>,
        goal_type: GoalType,
        deadline: Option<NaiveDate>,
    ) -> Result<Goal, AppError> {
        sqlx::query_as::<_, Goal>(
            "INSERT INTO goals (owner_id, title, description, goal_type, deadline, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id, owner_id, title, description, goal_type, deadline, created_at",
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(goal_type)
        .bind(deadline)
        .bind(Utc::now())
        .fetch_one(self.get_pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all goals owned by a user, in creation order.
    pub async fn get_goals_for_user(&self, owner_id: i64) -> Result<Vec<Goal>, AppError> {
        sqlx::query_as::<_, Goal>(
            "SELECT id, owner_id, title, description, goal_type, deadline, created_at
             FROM goals WHERE owner_id = ? ORDER BY id ASC",
        )
        .bind(owner_id)
        .fetch_all(self.get_pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
