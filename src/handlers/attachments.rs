//! Attachment collection and replay.
//!
//! Collection is a named flow with an explicit terminal action: once
//! entered, every media-bearing message (and plain text, stored with the
//! `text:` prefix) is captured until the "Done collecting" button or the
//! conversation TTL ends it.

use std::sync::Arc;

use crate::app::AppState;
use crate::dispatch::callbacks::CallbackPayload;
use crate::models::attachment::AttachmentRef;
use crate::models::task::Task;
use crate::notify::{self, TaskChange};
use crate::state::Flow;
use crate::telegram::{keyboards, CallbackEvent, ChatEvent, MessageEvent};
use crate::texts;
use crate::{AppError, Result};

/// `add_attachment|<task_id>` — enter collection mode.
///
/// Allowed for the owning admin and for assignees.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_add_attachment(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("add_attachment: bad task id".into()));
    };
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        return answer(event, texts::TASK_GONE, state).await;
    };

    if !actor_may_touch(event, &task, state).await? {
        return answer(event, texts::NO_PERMISSION, state).await;
    }

    let key = ChatEvent::Callback(event.clone()).conv_key();
    state
        .conversations
        .enter(key, Flow::CollectingAttachments { task_id })
        .await;
    if let Some(telegram) = &state.telegram {
        let prompt = telegram
            .send_with_inline(
                event.chat.chat_id,
                event.chat.thread_id,
                texts::COLLECTING_ATTACHMENTS,
                keyboards::done_collecting_keyboard(task_id),
            )
            .await?;
        state.conversations.track_cleanup(key, prompt).await;
    }
    Ok(())
}

/// A message while `CollectingAttachments` is active — capture its media
/// (or its text, prefixed) as attachments.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_collect(
    event: &MessageEvent,
    task_id: i64,
    state: &Arc<AppState>,
) -> Result<()> {
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        let key = ChatEvent::Message(event.clone()).conv_key();
        state.conversations.clear(key).await;
        return send_transient(event, texts::TASK_GONE, state).await;
    };

    let mut refs: Vec<AttachmentRef> = event.media.iter().cloned().map(AttachmentRef::File).collect();
    if refs.is_empty() {
        if let Some(text) = event.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            refs.push(AttachmentRef::Text(text.to_owned()));
        }
    }
    if refs.is_empty() {
        return Ok(());
    }

    let mut added_any = false;
    for attachment in refs {
        let added = state.attachments().add(task_id, &attachment.encode()).await?;
        if added {
            added_any = true;
            // Only the newly added item is pushed to the counterpart.
            fan_out(event, &task, &TaskChange::NewAttachment(attachment), state).await?;
        }
    }

    let text = if added_any {
        texts::ATTACHMENT_SAVED
    } else {
        texts::ATTACHMENT_DUPLICATE
    };
    send_transient(event, text, state).await
}

/// `attach_done|<task_id>` — explicit end of collection mode.
///
/// # Errors
///
/// Returns an error when a send fails.
pub async fn handle_attach_done(event: &CallbackEvent, state: &Arc<AppState>) -> Result<()> {
    let key = ChatEvent::Callback(event.clone()).conv_key();
    state.conversations.clear(key).await;
    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(event.origin, "Attachments updated", None)
            .await?;
    }
    Ok(())
}

/// `get_attachments|<task_id>` — replay stored attachments, branching on
/// the `text:` prefix per item.
///
/// # Errors
///
/// Returns an error when a lookup fails; per-item re-send failures are
/// best-effort.
pub async fn handle_get_attachments(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("get_attachments: bad task id".into()));
    };
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        return answer(event, texts::TASK_GONE, state).await;
    };
    if !actor_may_touch(event, &task, state).await? {
        return answer(event, texts::NO_PERMISSION, state).await;
    }

    let stored = state.attachments().list(task_id).await?;
    if stored.is_empty() {
        return answer(event, texts::NO_ATTACHMENTS, state).await;
    }

    if let Some(telegram) = &state.telegram {
        for raw in stored {
            let result = match AttachmentRef::decode(&raw) {
                AttachmentRef::Text(text) => telegram
                    .send_text(event.chat.chat_id, event.chat.thread_id, &text)
                    .await
                    .map(|_| ()),
                AttachmentRef::File(file_id) => {
                    telegram.send_document(event.chat.chat_id, &file_id).await
                }
            };
            if let Err(err) = result {
                tracing::warn!(%err, task_id, "failed to re-send attachment");
            }
        }
    }
    Ok(())
}

/// Whether the actor owns the task as admin or is assigned to it.
async fn actor_may_touch(
    event: &CallbackEvent,
    task: &Task,
    state: &Arc<AppState>,
) -> Result<bool> {
    let user = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    if user.is_admin {
        return Ok(true);
    }
    state.tasks().is_assigned(task.id, user.id).await
}

async fn fan_out(
    event: &MessageEvent,
    task: &Task,
    change: &TaskChange,
    state: &Arc<AppState>,
) -> Result<()> {
    let user = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    if task.admin_id == Some(user.id) {
        notify::notify_assignees(state, task, event.actor.telegram_id, change).await;
    } else {
        notify::notify_admin(
            state,
            task,
            event.actor.telegram_id,
            &event.actor.display_name,
            change,
        )
        .await;
    }
    Ok(())
}

async fn answer(event: &CallbackEvent, text: &str, state: &Arc<AppState>) -> Result<()> {
    if let Some(telegram) = &state.telegram {
        telegram.answer_callback(&event.callback_id, Some(text)).await?;
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
