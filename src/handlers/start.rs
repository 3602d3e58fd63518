//! Registration, main menu, help, and flow cancellation.

use std::sync::Arc;

use crate::app::AppState;
use crate::telegram::{keyboards, CallbackEvent, ChatContext, ChatKind, MessageEvent};
use crate::texts;
use crate::Result;

/// `/start` — register the sender and show the role-appropriate menu.
///
/// # Errors
///
/// Returns an error when the user lookup or the send fails.
pub async fn handle_start(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    // Registers first-time users as non-admins and refreshes the stored
    // display name and Telegram id for returning ones.
    let user = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    send_menu(&event.chat, user.is_admin, state).await
}

/// `/teledo` or the menu command — show the main menu.
///
/// # Errors
///
/// Returns an error when the user lookup or the send fails.
pub async fn show_main_menu(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    let is_admin = actor_is_admin(&event.chat, event.actor.telegram_id, &event.actor.display_name, state).await?;
    send_menu(&event.chat, is_admin, state).await
}

/// `teledo` callback — show the main menu from a button press.
///
/// # Errors
///
/// Returns an error when the user lookup or the send fails.
pub async fn show_menu_from_callback(event: &CallbackEvent, state: &Arc<AppState>) -> Result<()> {
    let is_admin = actor_is_admin(&event.chat, event.actor.telegram_id, &event.actor.display_name, state).await?;
    send_menu(&event.chat, is_admin, state).await
}

/// `/commands` — static help text.
///
/// # Errors
///
/// Returns an error when the send fails.
pub async fn handle_commands_help(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    if let Some(telegram) = &state.telegram {
        telegram
            .send_text(event.chat.chat_id, event.chat.thread_id, texts::COMMANDS_HELP)
            .await?;
    }
    Ok(())
}

/// Cancel signal — clear the flow, delete its accumulated messages, and
/// restore the main menu.
///
/// # Errors
///
/// Returns an error when the user lookup or the menu send fails; message
/// deletion is best-effort.
pub async fn handle_cancel(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    let key = crate::telegram::ChatEvent::Message(event.clone()).conv_key();
    let cleared = state.conversations.clear(key).await;

    if let Some(telegram) = &state.telegram {
        if let Some(conversation) = cleared {
            for target in conversation.cleanup {
                let _ = telegram.delete(target).await;
            }
        }
        // The cancel message itself is transient too.
        let _ = telegram
            .delete(crate::state::MessageRef {
                chat_id: event.chat.chat_id,
                message_id: event.message_id,
            })
            .await;
    }

    let is_admin = actor_is_admin(&event.chat, event.actor.telegram_id, &event.actor.display_name, state).await?;
    if let Some(telegram) = &state.telegram {
        telegram
            .send_with_menu(
                event.chat.chat_id,
                event.chat.thread_id,
                texts::CANCELLED,
                keyboards::main_menu(event.chat.kind, is_admin),
            )
            .await?;
    }
    Ok(())
}

/// Whether the actor is an admin, for menu rendering only — no denial
/// notice is sent here; mutating actions re-check through the gate.
async fn actor_is_admin(
    chat: &ChatContext,
    telegram_id: i64,
    display_name: &str,
    state: &Arc<AppState>,
) -> Result<bool> {
    if chat.kind.is_group_like() {
        if let Some(telegram) = &state.telegram {
            return telegram.is_chat_admin(chat.chat_id, telegram_id).await;
        }
    }
    let user = state
        .users()
        .get_or_create(display_name, Some(telegram_id), false)
        .await?;
    Ok(user.is_admin)
}

async fn send_menu(chat: &ChatContext, is_admin: bool, state: &Arc<AppState>) -> Result<()> {
    if let Some(telegram) = &state.telegram {
        let menu = keyboards::main_menu(chat.kind, is_admin);
        let text = if chat.kind == ChatKind::Private {
            "What do you want to do?"
        } else {
            "Menu"
        };
        telegram
            .send_with_menu(chat.chat_id, chat.thread_id, text, menu)
            .await?;
    }
    Ok(())
}
