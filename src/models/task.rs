//! Task model and status lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, nobody started yet.
    Pending,
    /// Somebody is working on it.
    InProgress,
    /// Finished.
    Done,
    /// Cannot proceed.
    Blocked,
}

impl TaskStatus {
    /// Parse a wire-format status token.
    ///
    /// Returns `None` for anything outside the four valid values so callers
    /// reject bad input before touching a row.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    /// Wire-format token stored in the database and callback payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    /// Human-readable label for message rendering.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Done => "Done",
            Self::Blocked => "Blocked",
        }
    }

    /// All statuses, in menu order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::InProgress, Self::Done, Self::Blocked];
}

/// The core work item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    /// Internal database identifier.
    pub id: i64,
    /// Required title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional start date.
    pub start_date: Option<NaiveDate>,
    /// Optional deadline.
    pub end_date: Option<NaiveDate>,
    /// Workflow status; defaults to [`TaskStatus::Pending`].
    pub status: TaskStatus,
    /// Owning admin.
    pub admin_id: Option<i64>,
    /// Scoping group, when the task belongs to a chat.
    pub group_id: Option<i64>,
    /// Scoping topic; a task with a topic belongs to that topic's group.
    pub topic_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Partial update for [`Task`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New start date.
    pub start_date: Option<NaiveDate>,
    /// New deadline.
    pub end_date: Option<NaiveDate>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New group scope; `Some(None)` clears it.
    pub group_id: Option<Option<i64>>,
    /// New topic scope; `Some(None)` clears it.
    pub topic_id: Option<Option<i64>>,
}

impl TaskPatch {
    /// Whether the patch changes anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.status.is_none()
            && self.group_id.is_none()
            && self.topic_id.is_none()
    }
}
