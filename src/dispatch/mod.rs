//! Event dispatch: exactly one handler per inbound event.
//!
//! Route selection is a pure function over (text, media, active flow) so
//! precedence is testable without a network: an active conversation flow
//! intercepts free text ahead of the command matcher, the cancel signal
//! wins over everything, and attachment-collection mode captures media
//! while letting commands pass through.

pub mod callbacks;
pub mod commands;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::app::AppState;
use crate::handlers;
use crate::state::Flow;
use crate::telegram::{CallbackEvent, ChatEvent, MessageEvent};
use crate::texts;
use crate::Result;

use callbacks::CallbackPayload;
use commands::SlashCommand;

/// Main-menu reply-keyboard actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Open the actor's assigned tasks.
    MyTasks,
    /// Open the task management browser.
    ManageTasks,
    /// Open user management.
    ManageUsers,
    /// Start the add-task flow.
    AddTask,
}

/// Which handler a message routes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Cancel signal while a flow is active.
    Cancel,
    /// The active flow consumes this text.
    FlowText,
    /// Attachment-collection mode captures this media.
    FlowMedia,
    /// A stateless slash command.
    Command(SlashCommand),
    /// A main-menu button press.
    Menu(MenuAction),
    /// Nothing to do.
    Ignore,
}

/// Select the route for a message given the actor's active flow.
#[must_use]
pub fn route_message(text: Option<&str>, has_media: bool, flow: Option<&Flow>) -> Route {
    if let Some(flow) = flow {
        if text == Some(texts::CANCEL_LABEL) {
            return Route::Cancel;
        }
        match flow {
            Flow::CollectingAttachments { .. } => {
                if has_media {
                    return Route::FlowMedia;
                }
                // Text that is not a command is captured as a literal
                // text attachment; commands still work while collecting.
                if let Some(text) = text {
                    if let Some(command) = commands::parse_command(text) {
                        return Route::Command(command);
                    }
                    if menu_action(text).is_none() {
                        return Route::FlowText;
                    }
                }
            }
            _ => {
                // State-bound handlers take precedence over the command
                // matcher: free text belongs to the flow.
                if text.is_some() {
                    return Route::FlowText;
                }
            }
        }
    }

    if let Some(text) = text {
        if let Some(command) = commands::parse_command(text) {
            return Route::Command(command);
        }
        if let Some(action) = menu_action(text) {
            return Route::Menu(action);
        }
    }
    Route::Ignore
}

fn menu_action(text: &str) -> Option<MenuAction> {
    match text.trim() {
        texts::MENU_MY_TASKS => Some(MenuAction::MyTasks),
        texts::MENU_MANAGE_TASKS => Some(MenuAction::ManageTasks),
        texts::MENU_MANAGE_USERS => Some(MenuAction::ManageUsers),
        texts::MENU_ADD_TASK => Some(MenuAction::AddTask),
        _ => None,
    }
}

/// Dispatch an inbound message. Never returns an error to the framework —
/// this is the error boundary.
pub async fn handle_message(event: MessageEvent, state: Arc<AppState>) {
    let key = ChatEvent::Message(event.clone()).conv_key();
    let flow = state.conversations.current(key).await;
    let route = route_message(event.text.as_deref(), !event.media.is_empty(), flow.as_ref());
    info!(
        chat_id = event.chat.chat_id,
        user_id = event.actor.telegram_id,
        ?route,
        "dispatching message"
    );

    let result = run_message_route(&event, route, flow, &state).await;
    if let Err(err) = result {
        error!(%err, chat_id = event.chat.chat_id, "message handler failed");
        surface_message_error(&event, &state).await;
    }
}

async fn run_message_route(
    event: &MessageEvent,
    route: Route,
    flow: Option<Flow>,
    state: &Arc<AppState>,
) -> Result<()> {
    match route {
        Route::Cancel => handlers::start::handle_cancel(event, state).await,
        Route::FlowText | Route::FlowMedia => match flow {
            Some(flow) => handlers::flow_input(event, flow, state).await,
            // Raced with the sweeper; nothing left to consume the input.
            None => Ok(()),
        },
        Route::Command(command) => run_command(event, command, state).await,
        Route::Menu(action) => run_menu(event, action, state).await,
        Route::Ignore => Ok(()),
    }
}

async fn run_command(
    event: &MessageEvent,
    command: SlashCommand,
    state: &Arc<AppState>,
) -> Result<()> {
    match command {
        SlashCommand::Start => handlers::start::handle_start(event, state).await,
        SlashCommand::Menu => handlers::start::show_main_menu(event, state).await,
        SlashCommand::Commands => handlers::start::handle_commands_help(event, state).await,
        SlashCommand::Add { title } => handlers::task_add::handle_add(event, title, state).await,
        SlashCommand::Tasks => handlers::task_view::handle_tasks(event, state).await,
        SlashCommand::MyTasks => handlers::my_tasks::handle_my_tasks(event, state).await,
        SlashCommand::User { username } => {
            handlers::quick_edit::handle_user_command(event, username, state).await
        }
        SlashCommand::Name { value } => {
            handlers::quick_edit::handle_quick_edit(
                event,
                handlers::quick_edit::QuickEditKind::Name,
                value,
                state,
            )
            .await
        }
        SlashCommand::Desc { value } => {
            handlers::quick_edit::handle_quick_edit(
                event,
                handlers::quick_edit::QuickEditKind::Desc,
                value,
                state,
            )
            .await
        }
        SlashCommand::Time { value } => {
            handlers::quick_edit::handle_quick_edit(
                event,
                handlers::quick_edit::QuickEditKind::Time,
                value,
                state,
            )
            .await
        }
        SlashCommand::Attach => handlers::quick_edit::handle_attach_command(event, state).await,
    }
}

async fn run_menu(event: &MessageEvent, action: MenuAction, state: &Arc<AppState>) -> Result<()> {
    match action {
        MenuAction::MyTasks => handlers::my_tasks::handle_my_tasks(event, state).await,
        MenuAction::ManageTasks => handlers::task_view::handle_tasks(event, state).await,
        MenuAction::ManageUsers => handlers::users::handle_manage_users(event, state).await,
        MenuAction::AddTask => handlers::task_add::handle_add(event, None, state).await,
    }
}

/// Dispatch an inline-button press. Never returns an error to the
/// framework — this is the error boundary.
pub async fn handle_callback(event: CallbackEvent, state: Arc<AppState>) {
    let Some(payload) = CallbackPayload::parse(&event.data) else {
        warn!(data = %event.data, "malformed callback payload");
        toast(&event, texts::MALFORMED_ACTION, &state).await;
        return;
    };
    info!(
        action = %payload.action,
        chat_id = event.chat.chat_id,
        user_id = event.actor.telegram_id,
        "dispatching callback"
    );

    let result = run_callback(&event, &payload, &state).await;
    match result {
        Ok(()) => {
            // Always acknowledge so the client stops its spinner; handlers
            // that already answered make this a cheap no-op failure.
            if let Some(telegram) = &state.telegram {
                let _ = telegram.answer_callback(&event.callback_id, None).await;
            }
        }
        Err(err) => {
            error!(%err, action = %payload.action, "callback handler failed");
            toast(&event, texts::GENERIC_ERROR, &state).await;
        }
    }
}

async fn run_callback(
    event: &CallbackEvent,
    payload: &CallbackPayload,
    state: &Arc<AppState>,
) -> Result<()> {
    match payload.action.as_str() {
        "teledo" => handlers::start::show_menu_from_callback(event, state).await,
        "my_tasks" => handlers::my_tasks::handle_my_tasks_callback(event, state).await,
        "view_group" => handlers::task_view::handle_view_group(event, payload, state).await,
        "view_topic" => handlers::task_view::handle_view_topic(event, payload, state).await,
        "view_task" | "show_task" => {
            handlers::task_view::handle_view_task(event, payload, state).await
        }
        "delete_task" => handlers::task_edit::handle_delete_task(event, payload, state).await,
        "edit_name" | "edit_desc" | "edit_end" | "edit_group" | "edit_topic" => {
            handlers::task_edit::handle_edit_button(event, payload, state).await
        }
        "change_status" => handlers::task_edit::handle_change_status(event, payload, state).await,
        "confirm_task" => handlers::task_add::handle_confirm(event, payload, state).await,
        "add_user" => handlers::task_users::handle_add_user(event, payload, state).await,
        "select_user" => handlers::task_users::handle_select_user(event, payload, state).await,
        "view_task_users" => {
            handlers::task_users::handle_view_task_users(event, payload, state).await
        }
        "del_users" => handlers::task_users::handle_del_users(event, payload, state).await,
        "remove_user" => handlers::task_users::handle_remove_user(event, payload, state).await,
        "add_attachment" => {
            handlers::attachments::handle_add_attachment(event, payload, state).await
        }
        "attach_done" => handlers::attachments::handle_attach_done(event, state).await,
        "get_attachments" => {
            handlers::attachments::handle_get_attachments(event, payload, state).await
        }
        "short_edit" => handlers::quick_edit::handle_short_edit(event, payload, state).await,
        "end_short_edit" => handlers::quick_edit::handle_end_short_edit(event, state).await,
        "info" => handlers::users::handle_user_info(event, payload, state).await,
        "toggle_admin" => handlers::users::handle_toggle_admin(event, payload, state).await,
        "delete_user_final" => handlers::users::handle_delete_user(event, payload, state).await,
        "register_user" => handlers::users::handle_register_user(event, payload, state).await,
        other => {
            warn!(action = other, "unknown callback action");
            toast(event, texts::MALFORMED_ACTION, state).await;
            Ok(())
        }
    }
}

async fn toast(event: &CallbackEvent, text: &str, state: &Arc<AppState>) {
    if let Some(telegram) = &state.telegram {
        let _ = telegram.answer_callback(&event.callback_id, Some(text)).await;
    }
}

async fn surface_message_error(event: &MessageEvent, state: &Arc<AppState>) {
    let Some(telegram) = &state.telegram else {
        return;
    };
    // Every error path still produces a user-visible acknowledgment.
    match telegram
        .send_text(event.chat.chat_id, event.chat.thread_id, texts::GENERIC_ERROR)
        .await
    {
        Ok(notice) => state.schedule_cleanup(vec![notice]),
        Err(err) => error!(%err, "failed to send error notice"),
    }
}
