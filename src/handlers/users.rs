//! User management: listing, info, admin toggle, deletion, registration.

use std::sync::Arc;

use crate::app::AppState;
use crate::dispatch::callbacks::CallbackPayload;
use crate::notify::TaskChange;
use crate::permissions::require_admin;
use crate::persistence::MutationOutcome;
use crate::state::{Flow, MessageRef};
use crate::telegram::{keyboards, CallbackEvent, ChatEvent, MessageEvent, Notification};
use crate::texts;
use crate::{AppError, Result};

/// Manage-users menu — list everyone with per-user info buttons.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_manage_users(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    if !require_admin(&ChatEvent::Message(event.clone()), state).await? {
        return Ok(());
    }
    let users = state.users().list_excluding(None, None).await?;
    if let Some(telegram) = &state.telegram {
        let mut keyboard = keyboards::users_keyboard(&users, "info");
        keyboard
            .inline_keyboard
            .push(vec![teloxide::types::InlineKeyboardButton::callback(
                "Register new user",
                CallbackPayload::encode("register_user", &[]),
            )]);
        telegram
            .send_with_inline(event.chat.chat_id, event.chat.thread_id, "Users", keyboard)
            .await?;
    }
    Ok(())
}

/// `info|<user_id>` — single-user view with toggle/delete actions.
///
/// # Errors
///
/// Returns an error when a lookup or edit fails.
pub async fn handle_user_info(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(user_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("info: bad user id".into()));
    };
    let Some(user) = state.users().get_by_id(user_id).await? else {
        return answer(event, texts::USER_GONE, state).await;
    };

    let tasks = state.tasks().list_for_user(user.id).await?;
    let role = if user.is_admin { "admin" } else { "user" };
    let reach = if user.is_reachable() {
        "reachable"
    } else {
        "never contacted the bot"
    };
    let text = format!(
        "\u{1f464} {}\nRole: {role}\nAssigned tasks: {}\n({reach})",
        user.username,
        tasks.len()
    );
    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(event.origin, &text, Some(keyboards::user_info_keyboard(&user)))
            .await?;
    }
    Ok(())
}

/// `toggle_admin|<user_id>` — flip the stored admin flag.
///
/// # Errors
///
/// Returns an error when persistence or an edit fails.
pub async fn handle_toggle_admin(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(user_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("toggle_admin: bad user id".into()));
    };
    if state.users().toggle_admin(user_id).await? == MutationOutcome::NotExist {
        return answer(event, texts::USER_GONE, state).await;
    }
    // Re-render the info view with the new role.
    handle_user_info(event, payload, state).await
}

/// `delete_user_final|<user_id>` — delete the user; assignments cascade.
///
/// # Errors
///
/// Returns an error when persistence or an edit fails.
pub async fn handle_delete_user(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(user_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("delete_user_final: bad user id".into()));
    };
    let Some(user) = state.users().get_by_id(user_id).await? else {
        return answer(event, texts::USER_GONE, state).await;
    };

    state.users().delete(user.id).await?;
    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(event.origin, &format!("\u{1f5d1} {} deleted", user.username), None)
            .await?;
    }
    Ok(())
}

/// `register_user[|<task_id>]` — start the register-by-name flow,
/// optionally assigning the new user to a task afterwards.
///
/// # Errors
///
/// Returns an error when a send fails.
pub async fn handle_register_user(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let task_id = payload.id_arg(0);
    let key = ChatEvent::Callback(event.clone()).conv_key();
    state
        .conversations
        .enter(key, Flow::WaitingForUsername { task_id })
        .await;
    if let Some(telegram) = &state.telegram {
        let prompt = telegram
            .send_with_menu(
                event.chat.chat_id,
                event.chat.thread_id,
                texts::ASK_USERNAME,
                keyboards::cancel_keyboard(),
            )
            .await?;
        state.conversations.track_cleanup(key, prompt).await;
    }
    Ok(())
}

/// Free text while `WaitingForUsername` is active — register the name
/// (pre-contact, no Telegram id yet) and optionally assign it.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_username_input(
    event: &MessageEvent,
    task_id: Option<i64>,
    state: &Arc<AppState>,
) -> Result<()> {
    let key = ChatEvent::Message(event.clone()).conv_key();
    let cleared = state.conversations.clear(key).await;
    if let Some(telegram) = &state.telegram {
        if let Some(conversation) = cleared {
            for target in conversation.cleanup {
                let _ = telegram.delete(target).await;
            }
        }
    }

    let username = event.text.as_deref().unwrap_or("").trim().to_owned();
    if username.is_empty() {
        return send_transient(event, texts::EMPTY_NAME, state).await;
    }

    let user = state.users().get_or_create(&username, None, false).await?;

    if let Some(task_id) = task_id {
        let Some(task) = state.tasks().get_by_id(task_id).await? else {
            return send_transient(event, texts::TASK_GONE, state).await;
        };
        state.users().assign(user.id, task.id).await?;
        if let Some(telegram) = &state.telegram {
            if let Some(telegram_id) = user.telegram_id {
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
        }
        return send_transient(event, &texts::user_assigned(&user.username, &task.title), state)
            .await;
    }

    send_transient(event, &format!("\u{2705} {} registered", user.username), state).await
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
