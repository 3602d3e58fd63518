//! Notification fan-out after task mutations.
//!
//! The side that did not make the change gets a short direct message per
//! recipient: assignees when an admin changed something, the owning admin
//! when an assignee changed status or attachments. Delivery is
//! best-effort per recipient through the buffered queue — one blocked
//! recipient never aborts the rest.

use chrono::NaiveDate;
use tracing::warn;

use crate::app::AppState;
use crate::dates;
use crate::models::attachment::AttachmentRef;
use crate::models::task::{Task, TaskStatus};
use crate::models::user::User;
use crate::telegram::Notification;
use crate::texts;

/// What changed on a task, for rendering a one-line notice.
#[derive(Debug, Clone)]
pub enum TaskChange {
    /// Title was changed.
    Renamed(String),
    /// Description was changed.
    DescriptionChanged,
    /// Deadline was set or moved.
    DeadlineChanged(NaiveDate),
    /// Status was changed.
    StatusChanged(TaskStatus),
    /// A single new attachment was added (never replays older ones).
    NewAttachment(AttachmentRef),
    /// The recipient was assigned to the task.
    Assigned,
    /// The recipient was removed from the task.
    Unassigned,
    /// The task was rescoped to another group or topic.
    Rescoped,
    /// The task was deleted.
    Deleted,
}

impl TaskChange {
    /// Human-readable change fragment.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Renamed(title) => format!("renamed to \u{201c}{title}\u{201d}"),
            Self::DescriptionChanged => "description updated".to_owned(),
            Self::DeadlineChanged(date) => {
                format!("deadline set to {}", dates::format_jalali(*date))
            }
            Self::StatusChanged(status) => texts::status_change(*status),
            Self::NewAttachment(attachment) => format!("new attachment {}", attachment.label()),
            Self::Assigned => "you were assigned".to_owned(),
            Self::Unassigned => "you were removed".to_owned(),
            Self::Rescoped => "moved to another group/topic".to_owned(),
            Self::Deleted => "deleted".to_owned(),
        }
    }
}

/// Reachable recipients among `users`, excluding the acting user.
#[must_use]
pub fn recipients(users: &[User], actor_telegram_id: i64) -> Vec<i64> {
    users
        .iter()
        .filter_map(|user| user.telegram_id)
        .filter(|tid| *tid != actor_telegram_id)
        .collect()
}

/// Notify every assignee of an admin-side change, individually.
pub async fn notify_assignees(state: &AppState, task: &Task, actor_telegram_id: i64, change: &TaskChange) {
    let Some(telegram) = &state.telegram else {
        return;
    };
    let users = match state.tasks().users_for_task(task.id).await {
        Ok(users) => users,
        Err(err) => {
            warn!(%err, task_id = task.id, "could not load assignees for notification");
            return;
        }
    };
    let text = texts::notify_task_changed(&task.title, &change.describe());
    for telegram_id in recipients(&users, actor_telegram_id) {
        if let Err(err) = telegram
            .enqueue(Notification {
                telegram_id,
                text: text.clone(),
            })
            .await
        {
            warn!(%err, telegram_id, "failed to queue assignee notification");
        }
    }
}

/// Notify the owning admin of an assignee-side change.
pub async fn notify_admin(
    state: &AppState,
    task: &Task,
    actor_telegram_id: i64,
    actor_name: &str,
    change: &TaskChange,
) {
    let Some(telegram) = &state.telegram else {
        return;
    };
    let Some(admin_id) = task.admin_id else {
        return;
    };
    let admin = match state.users().get_by_id(admin_id).await {
        Ok(Some(admin)) => admin,
        Ok(None) => return,
        Err(err) => {
            warn!(%err, task_id = task.id, "could not load owning admin for notification");
            return;
        }
    };
    let Some(telegram_id) = admin.telegram_id else {
        return;
    };
    if telegram_id == actor_telegram_id {
        return;
    }
    let text = texts::notify_by_user(actor_name, &task.title, &change.describe());
    if let Err(err) = telegram.enqueue(Notification { telegram_id, text }).await {
        warn!(%err, telegram_id, "failed to queue admin notification");
    }
}
