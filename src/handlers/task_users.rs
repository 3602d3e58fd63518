//! Assignment management on a task.

use std::sync::Arc;

use crate::app::AppState;
use crate::dispatch::callbacks::CallbackPayload;
use crate::notify::TaskChange;
use crate::permissions::require_admin;
use crate::persistence::MutationOutcome;
use crate::telegram::{keyboards, CallbackEvent, ChatEvent, Notification};
use crate::texts;
use crate::{AppError, Result};

/// `add_user|<task_id>` — present assignable users.
///
/// # Errors
///
/// Returns an error when a lookup or edit fails.
pub async fn handle_add_user(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("add_user: bad task id".into()));
    };
    if state.tasks().get_by_id(task_id).await?.is_none() {
        return answer(event, texts::TASK_GONE, state).await;
    }

    let candidates = state
        .users()
        .list_excluding(Some(event.actor.telegram_id), Some(task_id))
        .await?;
    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(
                event.origin,
                "Pick a user to assign",
                Some(keyboards::assign_users_keyboard(&candidates, task_id)),
            )
            .await?;
    }
    Ok(())
}

/// `select_user|<user_id>|<task_id>` — create the assignment.
///
/// Idempotent: re-assigning an already-assigned user is a no-op.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_select_user(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let (Some(user_id), Some(task_id)) = (payload.id_arg(0), payload.id_arg(1)) else {
        return Err(AppError::Validation("select_user: bad arguments".into()));
    };
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        return answer(event, texts::TASK_GONE, state).await;
    };
    let Some(user) = state.users().get_by_id(user_id).await? else {
        return answer(event, texts::USER_GONE, state).await;
    };

    state.users().assign(user.id, task.id).await?;

    if let Some(telegram) = &state.telegram {
        // Tell the assignee directly, best-effort.
        if let Some(telegram_id) = user.telegram_id {
            let _ = telegram
                .enqueue(Notification {
                    telegram_id,
                    text: texts::notify_task_changed(&task.title, &TaskChange::Assigned.describe()),
                })
                .await;
        }
        let (text, keyboard) = super::task_view::task_view_content(state, task.id).await?;
        telegram.edit_text(event.origin, &text, Some(keyboard)).await?;
        telegram
            .answer_callback(
                &event.callback_id,
                Some(&texts::user_assigned(&user.username, &task.title)),
            )
            .await?;
    }
    Ok(())
}

/// `view_task_users|<task_id>` — list the task's assignees.
///
/// # Errors
///
/// Returns an error when a lookup or edit fails.
pub async fn handle_view_task_users(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("view_task_users: bad task id".into()));
    };
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        return answer(event, texts::TASK_GONE, state).await;
    };

    let assignees = state.tasks().users_for_task(task_id).await?;
    let text = if assignees.is_empty() {
        format!("\u{1f4cb} {}\nNobody is assigned yet", task.title)
    } else {
        let names: Vec<&str> = assignees.iter().map(|u| u.username.as_str()).collect();
        format!("\u{1f4cb} {}\nAssignees: {}", task.title, names.join(", "))
    };
    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(
                event.origin,
                &text,
                Some(keyboards::task_list(
                    &[task],
                    "show_task",
                )),
            )
            .await?;
    }
    Ok(())
}

/// `del_users|<task_id>` — present assignees for removal.
///
/// # Errors
///
/// Returns an error when a lookup or edit fails.
pub async fn handle_del_users(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let Some(task_id) = payload.id_arg(0) else {
        return Err(AppError::Validation("del_users: bad task id".into()));
    };
    if state.tasks().get_by_id(task_id).await?.is_none() {
        return answer(event, texts::TASK_GONE, state).await;
    }

    let assignees = state.tasks().users_for_task(task_id).await?;
    if let Some(telegram) = &state.telegram {
        telegram
            .edit_text(
                event.origin,
                "Pick a user to remove",
                Some(keyboards::remove_users_keyboard(&assignees, task_id)),
            )
            .await?;
    }
    Ok(())
}

/// `remove_user|<user_id>|<task_id>` — drop the assignment.
///
/// # Errors
///
/// Returns an error when persistence or a send fails.
pub async fn handle_remove_user(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    if !require_admin(&ChatEvent::Callback(event.clone()), state).await? {
        return Ok(());
    }
    let (Some(user_id), Some(task_id)) = (payload.id_arg(0), payload.id_arg(1)) else {
        return Err(AppError::Validation("remove_user: bad arguments".into()));
    };
    let Some(task) = state.tasks().get_by_id(task_id).await? else {
        return answer(event, texts::TASK_GONE, state).await;
    };

    if state.users().remove_assignment(task_id, user_id).await? == MutationOutcome::NotExist {
        return answer(event, texts::USER_GONE, state).await;
    }

    if let Some(telegram) = &state.telegram {
        if let Some(Some(telegram_id)) = state
            .users()
            .get_by_id(user_id)
            .await?
            .map(|user| user.telegram_id)
        {
            let _ = telegram
                .enqueue(Notification {
                    telegram_id,
                    text: texts::notify_task_changed(
                        &task.title,
                        &TaskChange::Unassigned.describe(),
                    ),
                })
                .await;
        }
        let (text, keyboard) = super::task_view::task_view_content(state, task_id).await?;
        telegram.edit_text(event.origin, &text, Some(keyboard)).await?;
    }
    Ok(())
}

async fn answer(event: &CallbackEvent, text: &str, state: &Arc<AppState>) -> Result<()> {
    if let Some(telegram) = &state.telegram {
        telegram.answer_callback(&event.callback_id, Some(text)).await?;
    }
    Ok(())
}
