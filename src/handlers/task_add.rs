//! Add-task flows.
//!
//! In a group the title comes inline (`/add Ship release`) or from the
//! replied-to message, and the task is scoped to the invoking chat and
//! topic. In a private chat `/add` opens a two-step conversation:
//! collect the title, then confirm with "Submit" or "Add details" — both
//! create the task, the latter also opens the detail view for editing.

use std::sync::Arc;

use crate::app::AppState;
use crate::dispatch::callbacks::CallbackPayload;
use crate::permissions::require_admin;
use crate::persistence::task_repo::NewTask;
use crate::state::{Flow, MessageRef};
use crate::telegram::{keyboards, CallbackEvent, ChatEvent, ChatKind, MessageEvent};
use crate::texts;
use crate::Result;

/// `/add [title]` or the add-task menu button.
///
/// # Errors
///
/// Returns an error when a lookup, insert, or send fails.
pub async fn handle_add(
    event: &MessageEvent,
    inline_title: Option<String>,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Message(event.clone()), state).await? {
        return Ok(());
    }

    // Inline argument first, then the reply-sourced fallback.
    let title = inline_title.or_else(|| {
        event
            .reply
            .as_ref()
            .and_then(|reply| reply.text.clone())
            .filter(|text| !text.trim().is_empty())
    });

    if let Some(title) = title {
        return create_scoped_task(event, &title, state).await;
    }

    if event.chat.kind == ChatKind::Private {
        // No direct target: start the conversational flow.
        let key = ChatEvent::Message(event.clone()).conv_key();
        state.conversations.enter(key, Flow::WaitingForTitle).await;
        if let Some(telegram) = &state.telegram {
            let prompt = telegram
                .send_with_menu(
                    event.chat.chat_id,
                    event.chat.thread_id,
                    texts::ASK_TITLE,
                    keyboards::cancel_keyboard(),
                )
                .await?;
            state.conversations.track_cleanup(key, prompt).await;
        }
        return Ok(());
    }

    // Group chat without any title source.
    if let Some(telegram) = &state.telegram {
        let notice = telegram
            .send_text(event.chat.chat_id, event.chat.thread_id, texts::EMPTY_NAME)
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

/// Free text while `WaitingForTitle` or `ConfirmingTask` is active —
/// stage (or restage) the title and present the confirmation step.
///
/// # Errors
///
/// Returns an error when the send fails.
pub async fn handle_title_input(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    let key = ChatEvent::Message(event.clone()).conv_key();
    let title = event.text.as_deref().unwrap_or("").trim().to_owned();

    if title.is_empty() {
        if let Some(telegram) = &state.telegram {
            let notice = telegram
                .send_text(event.chat.chat_id, event.chat.thread_id, texts::EMPTY_NAME)
                .await?;
            state.schedule_cleanup(vec![notice]);
        }
        return Ok(());
    }

    state
        .conversations
        .enter(key, Flow::ConfirmingTask { title: title.clone() })
        .await;
    state
        .conversations
        .track_cleanup(
            key,
            MessageRef {
                chat_id: event.chat.chat_id,
                message_id: event.message_id,
            },
        )
        .await;

    if let Some(telegram) = &state.telegram {
        let prompt = telegram
            .send_with_inline(
                event.chat.chat_id,
                event.chat.thread_id,
                &texts::confirm_task(&title),
                keyboards::confirm_task_keyboard(),
            )
            .await?;
        state.conversations.track_cleanup(key, prompt).await;
    }
    Ok(())
}

/// `confirm_task|<submit|details>` — create the staged task.
///
/// Both choices create the task and clear the flow; `details` then opens
/// the detail view for follow-up edits.
///
/// # Errors
///
/// Returns an error when a lookup, insert, or send fails.
pub async fn handle_confirm(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let key = ChatEvent::Callback(event.clone()).conv_key();
    let Some(Flow::ConfirmingTask { title }) = state.conversations.current(key).await else {
        // Stale button from a superseded or swept conversation.
        if let Some(telegram) = &state.telegram {
            telegram
                .answer_callback(&event.callback_id, Some(texts::MALFORMED_ACTION))
                .await?;
        }
        return Ok(());
    };

    let admin = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    let task = state
        .tasks()
        .create(NewTask {
            title,
            admin_id: Some(admin.id),
            ..NewTask::default()
        })
        .await?;

    // Clear the flow and its transient prompts on both confirm paths.
    let cleared = state.conversations.clear(key).await;
    if let Some(telegram) = &state.telegram {
        if let Some(conversation) = cleared {
            for target in conversation.cleanup {
                let _ = telegram.delete(target).await;
            }
        }

        match payload.arg(0) {
            Some("details") => {
                let (text, keyboard) =
                    super::task_view::task_view_content(state, task.id).await?;
                telegram.edit_text(event.origin, &text, Some(keyboard)).await?;
            }
            _ => {
                telegram
                    .edit_text(event.origin, &texts::task_created(&task.title), None)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn create_scoped_task(
    event: &MessageEvent,
    title: &str,
    state: &Arc<AppState>,
) -> Result<()> {
    let mut group_id = None;
    let mut topic_id = None;
    if event.chat.kind.is_group_like() {
        let group = state
            .chats()
            .get_or_create_group(event.chat.chat_id, event.chat.title.as_deref())
            .await?;
        group_id = Some(group.id);
        if let Some(thread) = event.chat.thread_id {
            let topic = state
                .chats()
                .get_or_create_topic(thread, group.id, None, None)
                .await?;
            topic_id = Some(topic.id);
        }
    }

    let admin = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    let task = state
        .tasks()
        .create(NewTask {
            title: title.to_owned(),
            admin_id: Some(admin.id),
            group_id,
            topic_id,
            ..NewTask::default()
        })
        .await?;

    if let Some(telegram) = &state.telegram {
        let notice = telegram
            .send_text(
                event.chat.chat_id,
                event.chat.thread_id,
                &texts::task_created(&task.title),
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
    Ok(())
}
