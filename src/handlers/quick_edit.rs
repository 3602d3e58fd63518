//! Quick-edit commands with deferred task selection.
//!
//! `/name`, `/des`, `/time`, `/attach`, and `/user` stage a new value and
//! present one button per candidate task; the write happens only when the
//! target is picked, because the invoking message does not name a task.
//! Staged `/attach` media lives in the TTL cache under a generated key
//! that rides in the callback payload.

use std::sync::Arc;

use chrono::Utc;

use crate::app::AppState;
use crate::dates::{self, DateInputError};
use crate::dispatch::callbacks::{CallbackPayload, DELIMITER};
use crate::models::attachment::AttachmentRef;
use crate::models::task::{Task, TaskPatch};
use crate::notify::{self, TaskChange};
use crate::permissions::require_admin;
use crate::persistence::MutationOutcome;
use crate::state::MessageRef;
use crate::telegram::{keyboards, CallbackEvent, ChatEvent, MessageEvent, Notification};
use crate::texts;
use crate::{AppError, Result};

/// Which field a quick-edit command stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickEditKind {
    /// `/name` — rename.
    Name,
    /// `/des` — description.
    Desc,
    /// `/time` — deadline.
    Time,
}

impl QuickEditKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Desc => "des",
            Self::Time => "time",
        }
    }
}

/// `/name`, `/des`, `/time` — stage the value and defer the write to a
/// task pick.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_quick_edit(
    event: &MessageEvent,
    kind: QuickEditKind,
    inline_value: Option<String>,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Message(event.clone()), state).await? {
        return Ok(());
    }

    // Inline argument, then the reply-sourced fallback.
    let value = inline_value.or_else(|| {
        event
            .reply
            .as_ref()
            .and_then(|reply| reply.text.clone())
            .filter(|text| !text.trim().is_empty())
    });
    let Some(raw) = value else {
        return send_transient(event, texts::EMPTY_NAME, state).await;
    };
    let raw = raw.trim().to_owned();

    let staged_value = match kind {
        QuickEditKind::Name | QuickEditKind::Desc => sanitize(&raw),
        QuickEditKind::Time => {
            // Validate up front so the admin learns about a bad date
            // before picking a task; the two failures read differently.
            match dates::parse_deadline(&raw, Utc::now().date_naive()) {
                Ok(date) => date.format("%Y-%m-%d").to_string(),
                Err(DateInputError::BadFormat) => {
                    return send_transient(event, texts::BAD_DATE_FORMAT, state).await;
                }
                Err(DateInputError::NotFuture) => {
                    return send_transient(event, texts::DATE_NOT_FUTURE, state).await;
                }
            }
        }
    };

    let staged = CallbackPayload::encode("short_edit", &[kind.tag(), &staged_value]);
    present_task_pick(event, &staged, state).await
}

/// `/attach` — collect the replied-to message's media into the staged
/// cache and defer the write to a task pick.
///
/// Admins pick among the chat's tasks; other users among their own
/// assigned tasks.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_attach_command(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    let Some(reply) = &event.reply else {
        return send_transient(event, texts::ATTACH_NEEDS_REPLY, state).await;
    };

    let mut refs: Vec<String> = reply
        .media
        .iter()
        .map(|file_id| AttachmentRef::File(file_id.clone()).encode())
        .collect();
    if refs.is_empty() {
        // A plain-text reply target is stored as a text attachment.
        if let Some(text) = reply.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            refs.push(AttachmentRef::Text(text.to_owned()).encode());
        }
    }
    if refs.is_empty() {
        return send_transient(event, texts::ATTACH_NEEDS_REPLY, state).await;
    }

    let user = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    let is_admin = match (&state.telegram, event.chat.kind.is_group_like()) {
        (Some(telegram), true) => {
            telegram
                .is_chat_admin(event.chat.chat_id, event.actor.telegram_id)
                .await?
        }
        _ => user.is_admin,
    };

    let key = state.media.stage(refs).await;
    let staged = CallbackPayload::encode("short_edit", &["attach", &key]);

    if is_admin {
        return present_task_pick(event, &staged, state).await;
    }

    // Non-admin submissions target the actor's own tasks.
    let tasks = state.tasks().list_for_user(user.id).await?;
    if tasks.is_empty() {
        return send_transient(event, texts::NO_TASKS_HERE, state).await;
    }
    send_pick_keyboard(event, &tasks, &staged, state).await
}

/// `/user <name>` — stage an assignment and defer it to a task pick.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_user_command(
    event: &MessageEvent,
    inline_username: Option<String>,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Message(event.clone()), state).await? {
        return Ok(());
    }

    // Inline name, else the author of the replied-to message.
    let username = inline_username.or_else(|| {
        event
            .reply
            .as_ref()
            .and_then(|reply| reply.author_name.clone())
    });
    let Some(username) = username.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty()) else {
        return send_transient(event, texts::EMPTY_NAME, state).await;
    };

    let staged = CallbackPayload::encode("short_edit", &["user", &sanitize(&username)]);
    present_task_pick(event, &staged, state).await
}

/// `short_edit|<kind>|<value>|<task_id>` — apply the staged edit to the
/// picked task.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_short_edit(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    let (Some(kind), Some(value), Some(task_id)) =
        (payload.arg(0), payload.arg(1), payload.id_arg(2))
    else {
        return Err(AppError::Validation("short_edit: bad arguments".into()));
    };
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        return answer(event, texts::TASK_GONE, state).await;
    };

    // Attachment submissions are open to assignees; everything else is
    // admin-only.
    if kind == "attach" {
        if !actor_may_touch(event, &task, state).await? {
            return answer(event, texts::NO_PERMISSION, state).await;
        }
    } else if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }

    let confirmation = match kind {
        "name" => {
            let patch = TaskPatch {
                title: Some(value.to_owned()),
                ..TaskPatch::default()
            };
            if state.tasks().edit(task_id, patch).await? == MutationOutcome::NotExist {
                return answer(event, texts::TASK_GONE, state).await;
            }
            let task = Task {
                title: value.to_owned(),
                ..task
            };
            notify::notify_assignees(
                state,
                &task,
                event.actor.telegram_id,
                &TaskChange::Renamed(value.to_owned()),
            )
            .await;
            texts::task_updated(&task.title)
        }
        "des" => {
            let patch = TaskPatch {
                description: Some(value.to_owned()),
                ..TaskPatch::default()
            };
            if state.tasks().edit(task_id, patch).await? == MutationOutcome::NotExist {
                return answer(event, texts::TASK_GONE, state).await;
            }
            notify::notify_assignees(
                state,
                &task,
                event.actor.telegram_id,
                &TaskChange::DescriptionChanged,
            )
            .await;
            texts::task_updated(&task.title)
        }
        "time" => {
            let Some(date) = dates::parse_date(value) else {
                return answer(event, texts::BAD_DATE_FORMAT, state).await;
            };
            let patch = TaskPatch {
                end_date: Some(date),
                ..TaskPatch::default()
            };
            if state.tasks().edit(task_id, patch).await? == MutationOutcome::NotExist {
                return answer(event, texts::TASK_GONE, state).await;
            }
            notify::notify_assignees(
                state,
                &task,
                event.actor.telegram_id,
                &TaskChange::DeadlineChanged(date),
            )
            .await;
            texts::task_updated(&task.title)
        }
        "attach" => {
            let Some(refs) = state.media.take(value).await else {
                return answer(event, texts::STAGED_MEDIA_EXPIRED, state).await;
            };
            let mut added = 0usize;
            for raw in refs {
                if state.attachments().add(task_id, &raw).await? {
                    added += 1;
                    fan_out_attachment(event, &task, AttachmentRef::decode(&raw), state).await;
                }
            }
            if added == 0 {
                texts::ATTACHMENT_DUPLICATE.to_owned()
            } else {
                texts::ATTACHMENT_SAVED.to_owned()
            }
        }
        "user" => {
            let user = state.users().get_or_create(value, None, false).await?;
            state.users().assign(user.id, task.id).await?;
            if let (Some(telegram), Some(telegram_id)) = (&state.telegram, user.telegram_id) {
                let _ = telegram
                    .enqueue(Notification {
                        telegram_id,
                        text: texts::notify_task_changed(
                            &task.title,
                            &TaskChange::Assigned.describe(),
                        ),
                    })
                    .await;
            }
            texts::user_assigned(&user.username, &task.title)
        }
        other => {
            tracing::warn!(kind = other, "unknown short_edit kind");
            return answer(event, texts::MALFORMED_ACTION, state).await;
        }
    };

    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(
                event.origin,
                &confirmation,
                Some(keyboards::end_short_edit_keyboard()),
            )
            .await?;
    }
    Ok(())
}

/// `end_short_edit` — close a finished quick-edit picker.
///
/// # Errors
///
/// Returns an error when the delete fails.
pub async fn handle_end_short_edit(event: &CallbackEvent, state: &Arc<AppState>) -> Result<()> {
    if let Some(telegram) = &state.telegram {
        telegram.delete(event.origin).await?;
    }
    Ok(())
}

async fn fan_out_attachment(
    event: &CallbackEvent,
    task: &Task,
    attachment: AttachmentRef,
    state: &Arc<AppState>,
) {
    let change = TaskChange::NewAttachment(attachment);
    let actor_user = state
        .users()
        .get_by_telegram_id(event.actor.telegram_id)
        .await
        .ok()
        .flatten();
    let is_owner = actor_user
        .as_ref()
        .is_some_and(|user| task.admin_id == Some(user.id));
    if is_owner {
        notify::notify_assignees(state, task, event.actor.telegram_id, &change).await;
    } else {
        notify::notify_admin(
            state,
            task,
            event.actor.telegram_id,
            &event.actor.display_name,
            &change,
        )
        .await;
    }
}

/// Candidate tasks for the invoking group/topic, then the pick keyboard.
async fn present_task_pick(
    event: &MessageEvent,
    staged: &str,
    state: &Arc<AppState>,
) -> Result<()> {
    if !event.chat.kind.is_group_like() {
        return send_transient(event, texts::GROUP_ONLY, state).await;
    }
    let Some(group) = state
        .chats()
        .get_group_by_telegram_id(event.chat.chat_id)
        .await?
    else {
        return send_transient(event, texts::NO_TASKS_HERE, state).await;
    };

    let tasks = match event.chat.thread_id {
        Some(thread) => match state.chats().find_topic(thread, group.id).await? {
            Some(topic) => state.tasks().list_for_topic(topic.id).await?,
            None => return send_transient(event, texts::NO_TASKS_HERE, state).await,
        },
        None => state.tasks().list_for_group(group.id, false).await?,
    };
    if tasks.is_empty() {
        return send_transient(event, texts::NO_TASKS_HERE, state).await;
    }
    send_pick_keyboard(event, &tasks, staged, state).await
}

async fn send_pick_keyboard(
    event: &MessageEvent,
    tasks: &[Task],
    staged: &str,
    state: &Arc<AppState>,
) -> Result<()> {
    if let Some(telegram) = &state.telegram {
        telegram
            .send_with_inline(
                event.chat.chat_id,
                event.chat.thread_id,
                texts::PICK_TASK,
                keyboards::quick_edit_task_list(tasks, staged),
            )
            .await?;
        // The command message has served its purpose.
        let _ = telegram
            .delete(MessageRef {
                chat_id: event.chat.chat_id,
                message_id: event.message_id,
            })
            .await;
    }
    Ok(())
}

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

/// Keep staged values from breaking the `|`-delimited payload format.
fn sanitize(value: &str) -> String {
    value.replace(DELIMITER, "/")
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
        state.schedule_cleanup(vec![
            notice,
            MessageRef {
                chat_id: event.chat.chat_id,
                message_id: event.message_id,
            },
        ]);
    }
    Ok(())
}
