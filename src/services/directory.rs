// SPDX-License-Identifier: MIT

//! User directory: maps identity-provider subjects to internal users.

use crate::db::Db;
use crate::error::AppError;
use crate::models::User;

/// One-to-one, idempotent mapping from external identity to user record.
#[derive(Clone)]
pub struct UserDirectory {
    db: Db,
}

impl UserDirectory {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Resolve the internal user for an external subject, creating the
    /// record on first sight.
    ///
    /// Exactly one row ever exists per external id. The UNIQUE constraint
    /// on `users.external_id` settles concurrent first-sight calls; a
    /// losing writer re-reads the winning row instead of erroring.
    ///
    /// An existing record is returned unchanged, including its stored
    /// email, even when the provider now reports a different address.
    pub async fn ensure_user(&self, external_id: &str, email: &str) -> Result<User, AppError> {
        if external_id.trim().is_empty() {
            return Err(AppError::Validation(
                "external id must not be empty".to_string(),
            ));
        }

        if let Some(user) = self.db.get_user_by_external_id(external_id).await? {
            return Ok(user);
        }

        if let Some(user) = self.db.insert_user(external_id, email).await? {
            tracing::info!(user_id = user.id, external_id, "Created user on first sight");
            return Ok(user);
        }

        // Lost a concurrent first-sight race; the winner's row is authoritative.
        self.db
            .get_user_by_external_id(external_id)
            .await?
            .ok_or_else(|| {
                AppError::Database(format!(
                    "user row missing after insert conflict: {external_id}"
                ))
            })
    }

    /// Look up the internal user for an external subject without creating
    /// one. Read paths use this so a bare listing never writes.
    pub async fn find_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        self.db.get_user_by_external_id(external_id).await
    }
}
