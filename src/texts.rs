//! User-facing message strings.
//!
//! Plain constants and small format helpers; no runtime string catalog.

use crate::models::task::TaskStatus;

/// Reply-keyboard label cancelling the active flow.
pub const CANCEL_LABEL: &str = "\u{274c} Cancel";

/// Main-menu label opening the actor's assigned tasks.
pub const MENU_MY_TASKS: &str = "My tasks";
/// Main-menu label opening the task management browser.
pub const MENU_MANAGE_TASKS: &str = "Manage tasks";
/// Main-menu label opening user management.
pub const MENU_MANAGE_USERS: &str = "Manage users";
/// Main-menu label starting the add-task flow.
pub const MENU_ADD_TASK: &str = "Add task";

/// Denial notice for actors without admin rights.
pub const NO_PERMISSION: &str = "\u{274c} You are not allowed to run this command";
/// Generic fallback when a handler hits an unexpected error.
pub const GENERIC_ERROR: &str = "\u{274c} Something went wrong, please try again";
/// Toast for unreadable inline-button payloads.
pub const MALFORMED_ACTION: &str = "\u{274c} This button is no longer valid";
/// Notice when a referenced task has disappeared.
pub const TASK_GONE: &str = "\u{274c} This task no longer exists";
/// Prompt asking for a task title.
pub const ASK_TITLE: &str = "Send the title of the new task";
/// Prompt asking for a new task name.
pub const ASK_NEW_NAME: &str = "Send the new task name";
/// Prompt asking for a new description.
pub const ASK_NEW_DESC: &str = "Send the new task description";
/// Prompt asking for a new deadline.
pub const ASK_NEW_DEADLINE: &str = "Send the new deadline (for example 1405-01-15)";
/// Prompt asking for a group name.
pub const ASK_GROUP_NAME: &str = "Send the name of the group this task belongs to";
/// Prompt asking for a topic name.
pub const ASK_TOPIC_NAME: &str = "Send the name of the topic this task belongs to";
/// Prompt asking for a username to register.
pub const ASK_USERNAME: &str = "Send the display name of the user to register";
/// Error for empty name/title input.
pub const EMPTY_NAME: &str = "\u{274c} The name must not be empty";
/// Error for a deadline string no layout could parse.
pub const BAD_DATE_FORMAT: &str =
    "\u{274c} Could not read that date. Accepted formats: 1405-01-15, 2026-12-31, 31.12.2026";
/// Error for a deadline that parsed but is not in the future.
pub const DATE_NOT_FUTURE: &str = "\u{274c} The deadline must be after today";
/// Prompt for choosing a task before a deferred quick edit lands.
pub const PICK_TASK: &str = "Pick the task this change applies to";
/// Notice when the invoking chat has no tasks to pick from.
pub const NO_TASKS_HERE: &str = "\u{274c} No tasks found here";
/// Notice for commands that only work inside a group chat.
pub const GROUP_ONLY: &str = "\u{274c} This command only works in a group chat";
/// Notice when `/attach` is not a reply to a media message.
pub const ATTACH_NEEDS_REPLY: &str =
    "\u{274c} Reply to a message carrying the files you want to attach";
/// Notice when staged media expired before a task was picked.
pub const STAGED_MEDIA_EXPIRED: &str =
    "\u{274c} Those staged files expired, send the command again";
/// Notice after the collection flow captured a file.
pub const ATTACHMENT_SAVED: &str = "\u{2705} Attachment saved";
/// Notice when the captured file was already attached.
pub const ATTACHMENT_DUPLICATE: &str = "This file is already attached";
/// Prompt while attachment collection mode is active.
pub const COLLECTING_ATTACHMENTS: &str =
    "Send files to attach to this task, then press Done collecting";
/// Button label ending attachment collection.
pub const DONE_COLLECTING: &str = "Done collecting";
/// Confirmation after the flow was cancelled.
pub const CANCELLED: &str = "Cancelled";
/// Notice when a task has no attachments to show.
pub const NO_ATTACHMENTS: &str = "This task has no attachments";
/// Notice when a user record was not found.
pub const USER_GONE: &str = "\u{274c} This user no longer exists";
/// Help text listing the command surface.
pub const COMMANDS_HELP: &str = "Commands:\n\
    /add <title> — create a task (or reply to a message to use its text)\n\
    /tasks — browse and manage all tasks\n\
    /user <name> — assign a user to a task\n\
    /name <title> — rename a task\n\
    /des <text> — change a task description\n\
    /time <date> — set a task deadline\n\
    /attach — reply to a media message to attach its files\n\
    /my_tasks — your assigned tasks\n\
    /teledo — open the main menu";

/// Confirmation after a task was created.
#[must_use]
pub fn task_created(title: &str) -> String {
    format!("\u{2705} Task \u{201c}{title}\u{201d} created")
}

/// Prompt presenting the staged title with submit / add-details choices.
#[must_use]
pub fn confirm_task(title: &str) -> String {
    format!("Create task \u{201c}{title}\u{201d}?")
}

/// Confirmation after a task was deleted.
#[must_use]
pub fn task_deleted(title: &str) -> String {
    format!("\u{1f5d1} Task \u{201c}{title}\u{201d} deleted")
}

/// Confirmation after a field edit was applied.
#[must_use]
pub fn task_updated(title: &str) -> String {
    format!("\u{2705} Task \u{201c}{title}\u{201d} updated")
}

/// Confirmation after an assignment.
#[must_use]
pub fn user_assigned(username: &str, title: &str) -> String {
    format!("\u{2705} {username} assigned to \u{201c}{title}\u{201d}")
}

/// Notice when no group matches the supplied name.
#[must_use]
pub fn group_not_found(name: &str) -> String {
    format!("\u{274c} No group named \u{201c}{name}\u{201d}")
}

/// Notice when no topic matches the supplied name.
#[must_use]
pub fn topic_not_found(name: &str) -> String {
    format!("\u{274c} No topic named \u{201c}{name}\u{201d}")
}

/// Direct message telling an assignee about an admin-side change.
#[must_use]
pub fn notify_task_changed(title: &str, change: &str) -> String {
    format!("Task \u{201c}{title}\u{201d}: {change}")
}

/// Direct message telling the owning admin about an assignee-side change.
#[must_use]
pub fn notify_by_user(username: &str, title: &str, change: &str) -> String {
    format!("{username} \u{2014} task \u{201c}{title}\u{201d}: {change}")
}

/// Status-change fragment for notifications.
#[must_use]
pub fn status_change(status: TaskStatus) -> String {
    format!("status changed to {}", status.label())
}
