//! Group and topic repository for `SQLite` persistence.

use crate::models::chat::{Group, Topic};
use crate::Result;

use super::db::Database;

/// Repository wrapper around `SQLite` for group and topic records.
#[derive(Clone)]
pub struct ChatRepo {
    db: Database,
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    telegram_id: i64,
    name: Option<String>,
}

impl GroupRow {
    fn into_group(self) -> Group {
        Group {
            id: self.id,
            telegram_id: self.telegram_id,
            name: self.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TopicRow {
    id: i64,
    telegram_id: i64,
    group_id: i64,
    name: Option<String>,
    link: Option<String>,
}

impl TopicRow {
    fn into_topic(self) -> Topic {
        Topic {
            id: self.id,
            telegram_id: self.telegram_id,
            group_id: self.group_id,
            name: self.name,
            link: self.link,
        }
    }
}

impl ChatRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Retrieve a group by its Telegram chat id, creating it lazily.
    ///
    /// An existing record has its stored name refreshed when the observed
    /// title changed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails.
    pub async fn get_or_create_group(
        &self,
        telegram_id: i64,
        name: Option<&str>,
    ) -> Result<Group> {
        if let Some(group) = self.get_group_by_telegram_id(telegram_id).await? {
            if let Some(observed) = name {
                if group.name.as_deref() != Some(observed) {
                    sqlx::query("UPDATE groups SET name = ? WHERE id = ?")
                        .bind(observed)
                        .bind(group.id)
                        .execute(&self.db)
                        .await?;
                    return Ok(Group {
                        name: Some(observed.to_owned()),
                        ..group
                    });
                }
            }
            return Ok(group);
        }

        let result = sqlx::query("INSERT INTO groups (telegram_id, name) VALUES (?, ?)")
            .bind(telegram_id)
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(Group {
            id: result.last_insert_rowid(),
            telegram_id,
            name: name.map(str::to_owned),
        })
    }

    /// Retrieve a group by internal id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
        let row: Option<GroupRow> =
            sqlx::query_as("SELECT id, telegram_id, name FROM groups WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(GroupRow::into_group))
    }

    /// Retrieve a group by Telegram chat id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_group_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Group>> {
        let row: Option<GroupRow> =
            sqlx::query_as("SELECT id, telegram_id, name FROM groups WHERE telegram_id = ?")
                .bind(telegram_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(GroupRow::into_group))
    }

    /// Find a group by its stored display name (exact match).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find_group_by_name(&self, name: &str) -> Result<Option<Group>> {
        let row: Option<GroupRow> =
            sqlx::query_as("SELECT id, telegram_id, name FROM groups WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.db)
                .await?;
        Ok(row.map(GroupRow::into_group))
    }

    /// List all known groups.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        let rows: Vec<GroupRow> =
            sqlx::query_as("SELECT id, telegram_id, name FROM groups ORDER BY name")
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().map(GroupRow::into_group).collect())
    }

    /// Retrieve a topic by its Telegram thread id within a group, creating
    /// it lazily.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if any statement fails.
    pub async fn get_or_create_topic(
        &self,
        telegram_id: i64,
        group_id: i64,
        name: Option<&str>,
        link: Option<&str>,
    ) -> Result<Topic> {
        if let Some(topic) = self.find_topic(telegram_id, group_id).await? {
            return Ok(topic);
        }

        let result = sqlx::query(
            "INSERT INTO topics (telegram_id, group_id, name, link) VALUES (?, ?, ?, ?)",
        )
        .bind(telegram_id)
        .bind(group_id)
        .bind(name)
        .bind(link)
        .execute(&self.db)
        .await?;
        Ok(Topic {
            id: result.last_insert_rowid(),
            telegram_id,
            group_id,
            name: name.map(str::to_owned),
            link: link.map(str::to_owned),
        })
    }

    /// Retrieve a topic by internal id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_topic_by_id(&self, id: i64) -> Result<Option<Topic>> {
        let row: Option<TopicRow> = sqlx::query_as(
            "SELECT id, telegram_id, group_id, name, link FROM topics WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(TopicRow::into_topic))
    }

    /// Find a topic by Telegram thread id within a group.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find_topic(&self, telegram_id: i64, group_id: i64) -> Result<Option<Topic>> {
        let row: Option<TopicRow> = sqlx::query_as(
            "SELECT id, telegram_id, group_id, name, link FROM topics \
             WHERE telegram_id = ? AND group_id = ?",
        )
        .bind(telegram_id)
        .bind(group_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(TopicRow::into_topic))
    }

    /// Find a topic by its stored display name within a group.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find_topic_by_name(&self, group_id: i64, name: &str) -> Result<Option<Topic>> {
        let row: Option<TopicRow> = sqlx::query_as(
            "SELECT id, telegram_id, group_id, name, link FROM topics \
             WHERE group_id = ? AND name = ?",
        )
        .bind(group_id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(TopicRow::into_topic))
    }

    /// List topics, optionally restricted to one group.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_topics(&self, group_id: Option<i64>) -> Result<Vec<Topic>> {
        let rows: Vec<TopicRow> = sqlx::query_as(
            "SELECT id, telegram_id, group_id, name, link FROM topics \
             WHERE ? IS NULL OR group_id = ? ORDER BY name",
        )
        .bind(group_id)
        .bind(group_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(TopicRow::into_topic).collect())
    }
}
