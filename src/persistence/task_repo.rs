//! Task repository for `SQLite` persistence.

use chrono::{NaiveDate, Utc};

use crate::models::task::{Task, TaskPatch, TaskStatus};
use crate::models::user::User;
use crate::{AppError, Result};

use super::db::Database;
use super::MutationOutcome;

/// Fields for a new task; everything but the title is optional.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Required title; trimmed before insert.
    pub title: String,
    /// Owning admin.
    pub admin_id: Option<i64>,
    /// Scoping group.
    pub group_id: Option<i64>,
    /// Scoping topic; requires `group_id`.
    pub topic_id: Option<i64>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional deadline.
    pub end_date: Option<NaiveDate>,
}

/// Repository wrapper around `SQLite` for task records.
#[derive(Clone)]
pub struct TaskRepo {
    db: Database,
}

const TASK_COLUMNS: &str = "id, title, description, start_date, end_date, status, \
                            admin_id, group_id, topic_id, created_at";

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    status: String,
    admin_id: Option<i64>,
    group_id: Option<i64>,
    topic_id: Option<i64>,
    created_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let status = TaskStatus::parse(&self.status)
            .ok_or_else(|| AppError::Db(format!("invalid status: {}", self.status)))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|err| AppError::Db(format!("invalid created_at: {err}")))?
            .with_timezone(&Utc);
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            start_date: parse_stored_date(self.start_date.as_deref())?,
            end_date: parse_stored_date(self.end_date.as_deref())?,
            status,
            admin_id: self.admin_id,
            group_id: self.group_id,
            topic_id: self.topic_id,
            created_at,
        })
    }
}

fn parse_stored_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|err| AppError::Db(format!("invalid stored date: {err}")))
    })
    .transpose()
}

fn store_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

impl TaskRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new task. Status defaults to `pending`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the trimmed title is empty or a
    /// topic is supplied without its group, and `AppError::Db` if the
    /// insert fails.
    pub async fn create(&self, new: NewTask) -> Result<Task> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("task title must not be empty".into()));
        }
        if new.topic_id.is_some() && new.group_id.is_none() {
            return Err(AppError::Validation(
                "a task with a topic must belong to the topic's group".into(),
            ));
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tasks (title, description, end_date, status, admin_id, group_id, topic_id, created_at) \
             VALUES (?, ?, ?, 'pending', ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(new.description.as_deref())
        .bind(store_date(new.end_date))
        .bind(new.admin_id)
        .bind(new.group_id)
        .bind(new.topic_id)
        .bind(created_at.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(Task {
            id: result.last_insert_rowid(),
            title: title.to_owned(),
            description: new.description,
            start_date: None,
            end_date: new.end_date,
            status: TaskStatus::Pending,
            admin_id: new.admin_id,
            group_id: new.group_id,
            topic_id: new.topic_id,
            created_at,
        })
    }

    /// Retrieve a task by internal id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        row.map(TaskRow::into_task).transpose()
    }

    /// Apply a partial update; `None` fields are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the read or write fails.
    pub async fn edit(&self, task_id: i64, patch: TaskPatch) -> Result<MutationOutcome> {
        let Some(current) = self.get_by_id(task_id).await? else {
            return Ok(MutationOutcome::NotExist);
        };

        let title = patch.title.unwrap_or(current.title);
        let description = patch.description.or(current.description);
        let start_date = patch.start_date.or(current.start_date);
        let end_date = patch.end_date.or(current.end_date);
        let status = patch.status.unwrap_or(current.status);
        let group_id = patch.group_id.unwrap_or(current.group_id);
        let topic_id = patch.topic_id.unwrap_or(current.topic_id);

        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, start_date = ?, end_date = ?, \
             status = ?, group_id = ?, topic_id = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(description.as_deref())
        .bind(store_date(start_date))
        .bind(store_date(end_date))
        .bind(status.as_str())
        .bind(group_id)
        .bind(topic_id)
        .bind(task_id)
        .execute(&self.db)
        .await?;
        Ok(MutationOutcome::Applied)
    }

    /// Update only the status. The status is already validated by type.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn update_status(&self, task_id: i64, status: TaskStatus) -> Result<MutationOutcome> {
        let result = sqlx::query("UPDATE tasks SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(task_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(MutationOutcome::NotExist);
        }
        Ok(MutationOutcome::Applied)
    }

    /// Hard-delete a task; assignments and attachments cascade.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete(&self, task_id: i64) -> Result<MutationOutcome> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(MutationOutcome::NotExist);
        }
        Ok(MutationOutcome::Applied)
    }

    /// List every task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))
                .fetch_all(&self.db)
                .await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List tasks scoped to a group. With `topicless_only`, tasks that
    /// live in one of the group's topics are excluded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_group(&self, group_id: i64, topicless_only: bool) -> Result<Vec<Task>> {
        let sql = if topicless_only {
            format!(
                "SELECT {TASK_COLUMNS} FROM tasks \
                 WHERE group_id = ? AND topic_id IS NULL ORDER BY id"
            )
        } else {
            format!("SELECT {TASK_COLUMNS} FROM tasks WHERE group_id = ? ORDER BY id")
        };
        let rows: Vec<TaskRow> = sqlx::query_as(&sql).bind(group_id).fetch_all(&self.db).await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List tasks scoped to a topic.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_topic(&self, topic_id: i64) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE topic_id = ? ORDER BY id"))
                .bind(topic_id)
                .fetch_all(&self.db)
                .await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List tasks not scoped to any group.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_ungrouped(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE group_id IS NULL ORDER BY id"))
                .fetch_all(&self.db)
                .await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List tasks owned by an admin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_by_admin(&self, admin_id: i64) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE admin_id = ? ORDER BY id"))
                .bind(admin_id)
                .fetch_all(&self.db)
                .await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List tasks assigned to a user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT t.id, t.title, t.description, t.start_date, t.end_date, t.status, \
             t.admin_id, t.group_id, t.topic_id, t.created_at \
             FROM tasks t JOIN user_tasks ut ON ut.task_id = t.id \
             WHERE ut.user_id = ? ORDER BY t.id"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// List users assigned to a task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn users_for_task(&self, task_id: i64) -> Result<Vec<User>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i64,
            telegram_id: Option<i64>,
            username: String,
            is_admin: i64,
        }
        let rows: Vec<Row> = sqlx::query_as(
            "SELECT u.id, u.telegram_id, u.username, u.is_admin \
             FROM users u JOIN user_tasks ut ON ut.user_id = u.id \
             WHERE ut.task_id = ? ORDER BY u.username",
        )
        .bind(task_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| User {
                id: r.id,
                telegram_id: r.telegram_id,
                username: r.username,
                is_admin: r.is_admin != 0,
            })
            .collect())
    }

    /// Whether a user is assigned to a task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn is_assigned(&self, task_id: i64, user_id: i64) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM user_tasks WHERE task_id = ? AND user_id = ?")
                .bind(task_id)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.is_some())
    }
}
