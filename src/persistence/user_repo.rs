//! User and assignment repository for `SQLite` persistence.

use crate::models::user::User;
use crate::Result;

use super::db::Database;
use super::MutationOutcome;

/// Repository wrapper around `SQLite` for user records and task assignments.
#[derive(Clone)]
pub struct UserRepo {
    db: Database,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    telegram_id: Option<i64>,
    username: String,
    is_admin: i64,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            telegram_id: self.telegram_id,
            username: self.username,
            is_admin: self.is_admin != 0,
        }
    }
}

impl UserRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Retrieve a user by internal id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, telegram_id, username, is_admin FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(UserRow::into_user))
    }

    /// Retrieve a user by Telegram id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, telegram_id, username, is_admin FROM users WHERE telegram_id = ?",
        )
        .bind(telegram_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(UserRow::into_user))
    }

    /// Retrieve a user by display name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, telegram_id, username, is_admin FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(UserRow::into_user))
    }

    /// Retrieve a user by Telegram id or display name, or create one.
    ///
    /// Prefers the Telegram-id lookup, falls back to the display name. An
    /// existing record has its Telegram id filled in and its display name
    /// synced to the latest observed one. The admin flag is promote-only
    /// here — an existing admin is never silently demoted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails.
    pub async fn get_or_create(
        &self,
        username: &str,
        telegram_id: Option<i64>,
        is_admin: bool,
    ) -> Result<User> {
        let mut existing = match telegram_id {
            Some(tid) => self.get_by_telegram_id(tid).await?,
            None => None,
        };
        if existing.is_none() {
            existing = self.get_by_username(username).await?;
        }

        let Some(user) = existing else {
            let result = sqlx::query(
                "INSERT INTO users (telegram_id, username, is_admin) VALUES (?, ?, ?)",
            )
            .bind(telegram_id)
            .bind(username)
            .bind(i64::from(is_admin))
            .execute(&self.db)
            .await?;
            return Ok(User {
                id: result.last_insert_rowid(),
                telegram_id,
                username: username.to_owned(),
                is_admin,
            });
        };

        let promoted = user.is_admin || is_admin;
        let new_tid = telegram_id.or(user.telegram_id);
        let needs_sync =
            promoted != user.is_admin || new_tid != user.telegram_id || username != user.username;
        if needs_sync {
            sqlx::query("UPDATE users SET telegram_id = ?, username = ?, is_admin = ? WHERE id = ?")
                .bind(new_tid)
                .bind(username)
                .bind(i64::from(promoted))
                .bind(user.id)
                .execute(&self.db)
                .await?;
        }
        Ok(User {
            id: user.id,
            telegram_id: new_tid,
            username: username.to_owned(),
            is_admin: promoted,
        })
    }

    /// Stored admin flag for a Telegram id; `None` when the user is unknown.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn is_admin(&self, telegram_id: i64) -> Result<Option<bool>> {
        Ok(self
            .get_by_telegram_id(telegram_id)
            .await?
            .map(|user| user.is_admin))
    }

    /// Flip the admin flag on a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn toggle_admin(&self, user_id: i64) -> Result<MutationOutcome> {
        let result = sqlx::query("UPDATE users SET is_admin = 1 - is_admin WHERE id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(MutationOutcome::NotExist);
        }
        Ok(MutationOutcome::Applied)
    }

    /// Delete a user; assignments cascade.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete(&self, user_id: i64) -> Result<MutationOutcome> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(MutationOutcome::NotExist);
        }
        Ok(MutationOutcome::Applied)
    }

    /// List users, excluding the given Telegram id and, optionally, users
    /// already assigned to a task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_excluding(
        &self,
        exclude_telegram_id: Option<i64>,
        exclude_assigned_to: Option<i64>,
    ) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, telegram_id, username, is_admin FROM users \
             WHERE (? IS NULL OR telegram_id IS NULL OR telegram_id <> ?) \
             AND (? IS NULL OR id NOT IN (SELECT user_id FROM user_tasks WHERE task_id = ?)) \
             ORDER BY username",
        )
        .bind(exclude_telegram_id)
        .bind(exclude_telegram_id)
        .bind(exclude_assigned_to)
        .bind(exclude_assigned_to)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    /// Assign a user to a task. Idempotent — re-assigning is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn assign(&self, user_id: i64, task_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO user_tasks (user_id, task_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(task_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Remove a user's assignment from a task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn remove_assignment(&self, task_id: i64, user_id: i64) -> Result<MutationOutcome> {
        let result = sqlx::query("DELETE FROM user_tasks WHERE task_id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(MutationOutcome::NotExist);
        }
        Ok(MutationOutcome::Applied)
    }
}
