//! The actor's own assigned tasks.

use std::sync::Arc;

use crate::app::AppState;
use crate::dates;
use crate::models::task::Task;
use crate::telegram::{keyboards, CallbackEvent, ChatContext, MessageEvent};
use crate::Result;

/// `/my_tasks` or the menu button — one message per assigned task with
/// status buttons and attachment access.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_my_tasks(event: &MessageEvent, state: &Arc<AppState>) -> Result<()> {
    let user = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    let tasks = state.tasks().list_for_user(user.id).await?;
    send_task_cards(&event.chat, &tasks, state).await
}

/// `my_tasks` callback — same view from a button press.
///
/// # Errors
///
/// Returns an error when a lookup or send fails.
pub async fn handle_my_tasks_callback(event: &CallbackEvent, state: &Arc<AppState>) -> Result<()> {
    let user = state
        .users()
        .get_or_create(&event.actor.display_name, Some(event.actor.telegram_id), false)
        .await?;
    let tasks = state.tasks().list_for_user(user.id).await?;
    send_task_cards(&event.chat, &tasks, state).await
}

/// Render one task card.
#[must_use]
pub fn build_task_card(task: &Task) -> String {
    let mut out = format!("\u{1f4cb} {}\nStatus: {}", task.title, task.status.label());
    if let Some(desc) = &task.description {
        out.push_str(&format!("\n{desc}"));
    }
    if let Some(deadline) = task.end_date {
        out.push_str(&format!("\nDeadline: {}", dates::format_jalali(deadline)));
    }
    out
}

async fn send_task_cards(
    chat: &ChatContext,
    tasks: &[Task],
    state: &Arc<AppState>,
) -> Result<()> {
    let Some(telegram) = &state.telegram else {
        return Ok(());
    };
    if tasks.is_empty() {
        let notice = telegram
            .send_text(chat.chat_id, chat.thread_id, "You have no assigned tasks")
            .await?;
        state.schedule_cleanup(vec![notice]);
        return Ok(());
    }
    for task in tasks {
        telegram
            .send_with_inline(
                chat.chat_id,
                chat.thread_id,
                &build_task_card(task),
                keyboards::my_task_keyboard(task),
            )
            .await?;
    }
    Ok(())
}
