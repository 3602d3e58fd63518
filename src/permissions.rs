//! Admin permission gate.
//!
//! In group chats the live chat-membership role is authoritative — the
//! bot's stored flag is ignored there. In private chats the stored
//! `is_admin` flag decides. A `false` return means the caller must abort
//! without touching persistence beyond this check.

use crate::app::AppState;
use crate::telegram::ChatEvent;
use crate::texts;
use crate::Result;

/// Check whether the acting user may run admin operations in this chat.
///
/// On denial a transient notice is sent and scheduled for deletion.
/// Lookups are not read-only: resolving the actor in a private chat
/// creates an unregistered user as non-admin and syncs the stored display
/// name to the latest observed one.
///
/// # Errors
///
/// Returns `AppError::Db` or `AppError::Telegram` when the underlying
/// lookup fails.
pub async fn require_admin(event: &ChatEvent, state: &AppState) -> Result<bool> {
    let chat = event.chat();
    let actor = event.actor();

    let is_admin = if chat.kind.is_group_like() {
        match &state.telegram {
            Some(telegram) => telegram.is_chat_admin(chat.chat_id, actor.telegram_id).await?,
            // No live membership source under test; fall back to the
            // stored flag so the gate still gates.
            None => stored_admin(state, actor.telegram_id, &actor.display_name).await?,
        }
    } else {
        stored_admin(state, actor.telegram_id, &actor.display_name).await?
    };

    if !is_admin {
        deny(event, state).await;
    }
    Ok(is_admin)
}

async fn stored_admin(state: &AppState, telegram_id: i64, display_name: &str) -> Result<bool> {
    // get_or_create keeps the cached display name fresh and registers
    // first-time users as non-admins.
    let user = state
        .users()
        .get_or_create(display_name, Some(telegram_id), false)
        .await?;
    Ok(user.is_admin)
}

async fn deny(event: &ChatEvent, state: &AppState) {
    let Some(telegram) = &state.telegram else {
        return;
    };
    let chat = event.chat();
    match event {
        ChatEvent::Message(_) => {
            if let Ok(notice) = telegram
                .send_text(chat.chat_id, chat.thread_id, texts::NO_PERMISSION)
                .await
            {
                state.schedule_cleanup(vec![notice]);
            }
        }
        ChatEvent::Callback(callback) => {
            let _ = telegram
                .answer_callback(&callback.callback_id, Some(texts::NO_PERMISSION))
                .await;
        }
    }
}
