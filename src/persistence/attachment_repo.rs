//! Task attachment repository for `SQLite` persistence.
//!
//! One row per task holding an ordered JSON list of opaque attachment
//! references. Append-only with duplicate suppression.

use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for attachment lists.
#[derive(Clone)]
pub struct AttachmentRepo {
    db: Database,
}

impl AttachmentRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All attachment references for a task, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails or the stored list is
    /// corrupt.
    pub async fn list(&self, task_id: i64) -> Result<Vec<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT refs FROM task_attachments WHERE task_id = ?")
                .bind(task_id)
                .fetch_optional(&self.db)
                .await?;
        match row {
            Some((raw,)) => serde_json::from_str(&raw)
                .map_err(|err| AppError::Db(format!("invalid attachment list: {err}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Append a reference to a task's attachment list.
    ///
    /// Returns `true` when newly appended, `false` when the reference was
    /// already present (the list is left unchanged — dedup is an
    /// invariant, not an error).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails.
    pub async fn add(&self, task_id: i64, attachment_ref: &str) -> Result<bool> {
        let mut refs = self.list(task_id).await?;
        if refs.iter().any(|r| r == attachment_ref) {
            return Ok(false);
        }
        refs.push(attachment_ref.to_owned());

        let encoded = serde_json::to_string(&refs)
            .map_err(|err| AppError::Db(format!("failed to encode attachment list: {err}")))?;
        sqlx::query(
            "INSERT INTO task_attachments (task_id, refs) VALUES (?, ?) \
             ON CONFLICT(task_id) DO UPDATE SET refs = excluded.refs",
        )
        .bind(task_id)
        .bind(encoded)
        .execute(&self.db)
        .await?;
        Ok(true)
    }
}
