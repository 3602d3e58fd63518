//! Field-edit flows, status changes, and task deletion.

use std::sync::Arc;

use chrono::Utc;

use crate::app::AppState;
use crate::dates::{self, DateInputError};
use crate::dispatch::callbacks::CallbackPayload;
use crate::models::task::{Task, TaskPatch, TaskStatus};
use crate::notify::{self, TaskChange};
use crate::permissions::require_admin;
use crate::persistence::MutationOutcome;
use crate::state::{Flow, MessageRef};
use crate::telegram::{keyboards, CallbackEvent, ChatEvent, MessageEvent};
use crate::texts;
use crate::{AppError, Result};

/// `edit_name|edit_desc|edit_end|edit_group|edit_topic` + `<task_id>` —
/// enter the matching waiting flow with the button's message as the
/// in-place edit target.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_edit_button(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation(format!("{}: bad task id", payload.action)));
    };
    if state.tasks().get_by_id(task_id).await?.is_none() {
        if let Some(telegram) = &state.telegram {
            telegram
                .answer_callback(&event.callback_id, Some(texts::TASK_GONE))
                .await?;
        }
        return Ok(());
    }

    let origin = event.origin;
    let (flow, prompt) = match payload.action.as_str() {
        "edit_name" => (Flow::WaitingForName { task_id, origin }, texts::ASK_NEW_NAME),
        "edit_desc" => (Flow::WaitingForDesc { task_id, origin }, texts::ASK_NEW_DESC),
        "edit_end" => (
            Flow::WaitingForDeadline { task_id, origin },
            texts::ASK_NEW_DEADLINE,
        ),
        "edit_group" => (
            Flow::WaitingForGroupName { task_id, origin },
            texts::ASK_GROUP_NAME,
        ),
        "edit_topic" => (
            Flow::WaitingForTopicName { task_id, origin },
            texts::ASK_TOPIC_NAME,
        ),
        other => return Err(AppError::Validation(format!("unknown edit action: {other}"))),
    };

    let key = ChatEvent::Callback(event.clone()).conv_key();
    state.conversations.enter(key, flow).await;
    if let Some(telegram) = &state.telegram {
        let sent = telegram
            .send_with_menu(
                event.chat.chat_id,
                event.chat.thread_id,
                prompt,
                keyboards::cancel_keyboard(),
            )
            .await?;
        state.conversations.track_cleanup(key, sent).await;
    }
    Ok(())
}

/// Free text while `WaitingForName` is active.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_name_input(
    event: &MessageEvent,
    task_id: i64,
    origin: MessageRef,
    state: &Arc<AppState>,
) -> Result<()> {
    let input = finish_flow(event, state).await;
    let value = input.trim();
    if value.is_empty() {
        return send_transient(event, texts::EMPTY_NAME, state).await;
    }

    let patch = TaskPatch {
        title: Some(value.to_owned()),
        ..TaskPatch::default()
    };
    apply_patch(event, task_id, origin, patch, TaskChange::Renamed(value.to_owned()), state).await
}

/// Free text while `WaitingForDesc` is active.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_desc_input(
    event: &MessageEvent,
    task_id: i64,
    origin: MessageRef,
    state: &Arc<AppState>,
) -> Result<()> {
    let input = finish_flow(event, state).await;
    let value = input.trim();
    if value.is_empty() {
        return send_transient(event, texts::EMPTY_NAME, state).await;
    }

    let patch = TaskPatch {
        description: Some(value.to_owned()),
        ..TaskPatch::default()
    };
    apply_patch(event, task_id, origin, patch, TaskChange::DescriptionChanged, state).await
}

/// Free text while `WaitingForDeadline` is active.
///
/// The two rejection reasons are surfaced distinctly: an unparseable
/// string vs a date that is not strictly in the future.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_deadline_input(
    event: &MessageEvent,
    task_id: i64,
    origin: MessageRef,
    state: &Arc<AppState>,
) -> Result<()> {
    let input = finish_flow(event, state).await;
    let today = Utc::now().date_naive();
    let date = match dates::parse_deadline(input.trim(), today) {
        Ok(date) => date,
        Err(DateInputError::BadFormat) => {
            return send_transient(event, texts::BAD_DATE_FORMAT, state).await;
        }
        Err(DateInputError::NotFuture) => {
            return send_transient(event, texts::DATE_NOT_FUTURE, state).await;
        }
    };

    let patch = TaskPatch {
        end_date: Some(date),
        ..TaskPatch::default()
    };
    apply_patch(event, task_id, origin, patch, TaskChange::DeadlineChanged(date), state).await
}

/// Free text while `WaitingForGroupName` is active.
///
/// Rescoping to a group directly clears any topic, keeping the
/// topic-implies-group invariant.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_group_name_input(
    event: &MessageEvent,
    task_id: i64,
    origin: MessageRef,
    state: &Arc<AppState>,
) -> Result<()> {
    let input = finish_flow(event, state).await;
    let value = input.trim();
    if value.is_empty() {
        return send_transient(event, texts::EMPTY_NAME, state).await;
    }
    let Some(group) = state.chats().find_group_by_name(value).await? else {
        return send_transient(event, &texts::group_not_found(value), state).await;
    };

    let patch = TaskPatch {
        group_id: Some(Some(group.id)),
        topic_id: Some(None),
        ..TaskPatch::default()
    };
    apply_patch(event, task_id, origin, patch, TaskChange::Rescoped, state).await
}

/// Free text while `WaitingForTopicName` is active.
///
/// Assigning a topic also sets its owning group.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_topic_name_input(
    event: &MessageEvent,
    task_id: i64,
    origin: MessageRef,
    state: &Arc<AppState>,
) -> Result<()> {
    let input = finish_flow(event, state).await;
    let value = input.trim();
    if value.is_empty() {
        return send_transient(event, texts::EMPTY_NAME, state).await;
    }

    let task = state.tasks().get_by_id(task_id).await?;
    let topic = match task.as_ref().and_then(|t| t.group_id) {
        Some(group_id) => state.chats().find_topic_by_name(group_id, value).await?,
        None => {
            // Task has no group yet: match the name across all topics.
            let topics = state.chats().list_topics(None).await?;
            topics.into_iter().find(|t| t.name.as_deref() == Some(value))
        }
    };
    let Some(topic) = topic else {
        return send_transient(event, &texts::topic_not_found(value), state).await;
    };

    let patch = TaskPatch {
        group_id: Some(Some(topic.group_id)),
        topic_id: Some(Some(topic.id)),
        ..TaskPatch::default()
    };
    apply_patch(event, task_id, origin, patch, TaskChange::Rescoped, state).await
}

/// `delete_task|<task_id>` — hard delete with cascade.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_delete_task(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("delete_task: bad task id".into()));
    };
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        if let Some(telegram) = &state.telegram {
            telegram
                .answer_callback(&event.callback_id, Some(texts::TASK_GONE))
                .await?;
        }
        return Ok(());
    };

    // Assignees must be notified, so fan out before the cascade removes
    // the assignment rows.
    notify::notify_assignees(state, &task, event.actor.telegram_id, &TaskChange::Deleted).await;
    state.tasks().delete(task_id).await?;

    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(event.origin, &texts::task_deleted(&task.title), None)
            .await?;
    }
    Ok(())
}

/// `change_status|<task_id>|<status>` — admin or assignee updates the
/// status; the other side is notified.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_change_status(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("change_status: bad task id".into()));
    };
    // Reject an invalid status token before touching the row.
    let Some(status) = payload.arg(1).and_then(TaskStatus::parse) else {
        if let Some(telegram) = &state.telegram {
            telegram
                .answer_callback(&event.callback_id, Some(texts::MALFORMED_ACTION))
                .await?;
        }
        return Ok(());
    };

    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        if let Some(telegram) = &state.telegram {
            telegram
                .answer_callback(&event.callback_id, Some(texts::TASK_GONE))
                .await?;
        }
        return Ok(());
    };

    let user = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    let is_assignee = state.tasks().is_assigned(task_id, user.id).await?;
    if !user.is_admin && !is_assignee {
        if let Some(telegram) = &state.telegram {
            telegram
                .answer_callback(&event.callback_id, Some(texts::NO_PERMISSION))
                .await?;
        }
        return Ok(());
    }

    if state.tasks().update_status(task_id, status).await? == MutationOutcome::NotExist {
        if let Some(telegram) = &state.telegram {
            telegram
                .answer_callback(&event.callback_id, Some(texts::TASK_GONE))
                .await?;
        }
        return Ok(());
    }
    let task = Task { status, ..task };

    let change = TaskChange::StatusChanged(status);
    if task.admin_id == Some(user.id) {
        notify::notify_assignees(state, &task, event.actor.telegram_id, &change).await;
    } else {
        notify::notify_admin(
            state,
            &task,
            event.actor.telegram_id,
            &event.actor.display_name,
            &change,
        )
        .await;
    }

    if let Some(telegram) = &state.telegram {
        if user.is_admin {
            let (text, keyboard) = super::task_view::task_view_content(state, task_id).await?;
            telegram.edit_text(event.origin, &text, Some(keyboard)).await?;
        } else {
            let text = format!("\u{1f4cb} {}\nStatus: {}", task.title, status.label());
            telegram
                .edit_text(event.origin, &text, Some(keyboards::my_task_keyboard(&task)))
                .await?;
        }
    }
    Ok(())
}

/// Clear the flow unconditionally and return the input text.
///
/// A failed validation afterwards re-prompts with a fresh transient
/// message but does not re-enter the waiting state.
async fn finish_flow(event: &MessageEvent, state: &Arc<AppState>) -> String {
    let key = ChatEvent::Message(event.clone()).conv_key();
    let cleared = state.conversations.clear(key).await;
    if let Some(telegram) = &state.telegram {
        if let Some(conversation) = cleared {
            for target in conversation.cleanup {
                let _ = telegram.delete(target).await;
            }
        }
    }
    event.text.clone().unwrap_or_default()
}

async fn apply_patch(
    event: &MessageEvent,
    task_id: i64,
    origin: MessageRef,
    patch: TaskPatch,
    change: TaskChange,
    state: &Arc<AppState>,
) -> Result<()> {
    if state.tasks().edit(task_id, patch).await? == MutationOutcome::NotExist {
        return send_transient(event, texts::TASK_GONE, state).await;
    }

    if let Some(task) = state.tasks().get_by_id(task_id).await? {
        notify::notify_assignees(state, &task, event.actor.telegram_id, &change).await;

        if let Some(telegram) = &state.telegram {
            // Re-render the original detail message in place.
            let (text, keyboard) = super::task_view::task_view_content(state, task_id).await?;
            telegram.edit_text(origin, &text, Some(keyboard)).await?;

            let notice = telegram
                .send_text(
                    event.chat.chat_id,
                    event.chat.thread_id,
                    &texts::task_updated(&task.title),
                )
                .await?;
            state.schedule_cleanup(vec![
                notice,
                MessageRef {
                    chat_id: event.chat.chat_id,
                    message_id: event.message_id,
                },
            ]);
        }
    }
    Ok(())
}

async fn send_transient(event: &MessageEvent, text: &str, state: &Arc<AppState>) -> Result<()> {
    if let Some(telegram) = &state.telegram {
        let notice = telegram
            .send_text(event.chat.chat_id, event.chat.thread_id, text)
            .await?;
        state.schedule_cleanup(vec![notice]);
    }
    Ok(())
}
