//! Task browsing: group → topic → task list → task detail.
//!
//! The detail view is produced by a pure builder shared by every handler
//! that needs to render or refresh it — there is no synthetic event
//! replay anywhere.

use std::sync::Arc;

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::app::AppState;
use crate::dates;
use crate::dispatch::callbacks::CallbackPayload;
use crate::models::chat::{Group, Topic};
use crate::models::task::Task;
use crate::models::user::User;
use crate::permissions::require_admin;
use crate::telegram::{keyboards, CallbackEvent, ChatEvent, MessageEvent};
use crate::texts;
use crate::{AppError, Result};

/// Render the task-detail text from already-loaded context.
#[must_use]
pub fn build_task_view(
    task: &Task,
    assignees: &[User],
    attachment_count: usize,
    group: Option<&Group>,
    topic: Option<&Topic>,
) -> String {
    let none = "\u{2014}";
    let mut out = format!("\u{1f4cb} {}\nStatus: {}", task.title, task.status.label());
    out.push_str(&format!(
        "\nDescription: {}",
        task.description.as_deref().unwrap_or(none)
    ));
    out.push_str(&format!(
        "\nDeadline: {}",
        task.end_date.map_or_else(|| none.to_owned(), dates::format_jalali)
    ));
    out.push_str(&format!(
        "\nGroup: {}",
        group
            .and_then(|g| g.name.as_deref())
            .unwrap_or(none)
    ));
    out.push_str(&format!(
        "\nTopic: {}",
        topic
            .and_then(|t| t.name.as_deref())
            .unwrap_or(none)
    ));
    if assignees.is_empty() {
        out.push_str(&format!("\nAssignees: {none}"));
    } else {
        let names: Vec<&str> = assignees.iter().map(|u| u.username.as_str()).collect();
        out.push_str(&format!("\nAssignees: {}", names.join(", ")));
    }
    out.push_str(&format!("\nAttachments: {attachment_count}"));
    out
}

/// Load everything the detail view needs and render text plus keyboard.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the task is gone and `AppError::Db`
/// on query failure.
pub async fn task_view_content(
    state: &Arc<AppState>,
    task_id: i64,
) -> Result<(String, InlineKeyboardMarkup)> {
    let task = state
        .tasks()
        .get_by_id(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {task_id}")))?;
    let assignees = state.tasks().users_for_task(task.id).await?;
    let attachments = state.attachments().list(task.id).await?;
    let group = match task.group_id {
        Some(id) => state.chats().get_group_by_id(id).await?,
        None => None,
    };
    let topic = match task.topic_id {
        Some(id) => state.chats().get_topic_by_id(id).await?,
        None => None,
    };
    let text = build_task_view(&task, &assignees, attachments.len(), group.as_ref(), topic.as_ref());
    Ok((text, keyboards::task_view_keyboard(&task)))
}

/// `/tasks` or the manage-tasks menu — open the group browser.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_tasks(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    if !require_admin(&ChatEvent::Message(event.clone()), state).await? {
        return Ok(());
    }
    let groups = state.chats().list_groups().await?;
    if let Some(telegram) = &state.telegram {
        telegram
            .send_with_inline(
                event.chat.chat_id,
                event.chat.thread_id,
                "Pick a group",
                keyboards::groups_keyboard(&groups),
            )
            .await?;
    }
    Ok(())
}

/// `view_group|<id|OTHER>` — show the group's topics, or ungrouped tasks.
///
/// # Errors
///
/// Returns an error when a lookup or edit fails.
pub async fn handle_view_group(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(telegram) = &state.telegram else {
        return Ok(());
    };

    if payload.arg(0) == Some("OTHER") {
        let tasks = state.tasks().list_ungrouped().await?;
        let (text, keyboard) = task_list_content(&tasks);
        telegram.edit_text(event.origin, text, Some(keyboard)).await?;
        return Ok(());
    }

    let Some(group_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("view_group: bad group id".into()));
    };
    let topics = state.chats().list_topics(Some(group_id)).await?;
    if topics.is_empty() {
        let tasks = state.tasks().list_for_group(group_id, false).await?;
        let (text, keyboard) = task_list_content(&tasks);
        telegram.edit_text(event.origin, text, Some(keyboard)).await?;
    } else {
        telegram
            .edit_text(
                event.origin,
                "Pick a topic",
                Some(keyboards::topics_keyboard(&topics, group_id)),
            )
            .await?;
    }
    Ok(())
}

/// `view_topic|<id>` or `view_topic|OTHER|<group_id>` — show the topic's
/// tasks, or the group's topicless ones.
///
/// # Errors
///
/// Returns an error when a lookup or edit fails.
pub async fn handle_view_topic(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(telegram) = &state.telegram else {
        return Ok(());
    };

    let tasks = if payload.arg(0) == Some("OTHER") {
        let Some(group_id) = payload.id_arg(1) else {
            return Err(AppError::Validation("view_topic: bad group id".into()));
        };
        state.tasks().list_for_group(group_id, true).await?
    } else {
        let Some(topic_id) = payload.id_arg(0) else {
            return Err(AppError::Validation("view_topic: bad topic id".into()));
        };
        state.tasks().list_for_topic(topic_id).await?
    };

    let (text, keyboard) = task_list_content(&tasks);
    telegram.edit_text(event.origin, text, Some(keyboard)).await?;
    Ok(())
}

/// `view_task|<id>` — render the task-detail view in place.
///
/// # Errors
///
/// Returns an error when a lookup or edit fails.
pub async fn handle_view_task(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("view_task: bad task id".into()));
    };
    let Some(telegram) = &state.telegram else {
        return Ok(());
    };

    match task_view_content(state, task_id).await {
        Ok((text, keyboard)) => {
            telegram.edit_text(event.origin, &text, Some(keyboard)).await?;
        }
        Err(AppError::NotFound(_)) => {
            telegram
                .answer_callback(&event.callback_id, Some(texts::TASK_GONE))
                .await?;
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

fn task_list_content(tasks: &[Task]) -> (&'static str, InlineKeyboardMarkup) {
    if tasks.is_empty() {
        (
            texts::NO_TASKS_HERE,
            InlineKeyboardMarkup::new(Vec::<Vec<InlineKeyboardButton>>::new()),
        )
    } else {
        ("Pick a task", keyboards::task_list(tasks, "view_task"))
    }
}
