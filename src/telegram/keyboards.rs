//! Inline and reply keyboard builders.

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup as ReplyKeyboardMarkup,
};

use crate::dispatch::callbacks::CallbackPayload;
use crate::models::chat::{Group, Topic};
use crate::models::task::{Task, TaskStatus};
use crate::models::user::User;
use crate::telegram::event::ChatKind;
use crate::texts;

/// Role- and chat-kind-dependent main menu.
#[must_use]
pub fn main_menu(kind: ChatKind, is_admin: bool) -> ReplyKeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = if kind == ChatKind::Private {
        if is_admin {
            vec![
                vec![KeyboardButton::new(texts::MENU_MY_TASKS)],
                vec![
                    KeyboardButton::new(texts::MENU_MANAGE_TASKS),
                    KeyboardButton::new(texts::MENU_MANAGE_USERS),
                ],
            ]
        } else {
            vec![vec![KeyboardButton::new(texts::MENU_MY_TASKS)]]
        }
    } else if is_admin {
        vec![
            vec![KeyboardButton::new(texts::MENU_MANAGE_TASKS)],
            vec![
                KeyboardButton::new(texts::MENU_ADD_TASK),
                KeyboardButton::new(texts::MENU_MANAGE_USERS),
            ],
        ]
    } else {
        vec![vec![KeyboardButton::new(texts::MENU_MY_TASKS)]]
    };
    ReplyKeyboardMarkup::new(rows).resize_keyboard()
}

/// Single-button reply keyboard cancelling the active flow.
#[must_use]
pub fn cancel_keyboard() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::new(vec![vec![KeyboardButton::new(texts::CANCEL_LABEL)]])
        .resize_keyboard()
        .one_time_keyboard()
}

/// Submit / add-details choices for the add-task confirmation step.
#[must_use]
pub fn confirm_task_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Submit", CallbackPayload::encode("confirm_task", &["submit"])),
        InlineKeyboardButton::callback(
            "Add details",
            CallbackPayload::encode("confirm_task", &["details"]),
        ),
    ]])
}

/// One button per task, payload `{action}|{task_id}`.
#[must_use]
pub fn task_list(tasks: &[Task], action: &str) -> InlineKeyboardMarkup {
    let rows = tasks
        .iter()
        .map(|task| {
            vec![InlineKeyboardButton::callback(
                task.title.clone(),
                CallbackPayload::encode(action, &[&task.id.to_string()]),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// One button per task for a staged quick edit; `staged` already carries
/// `short_edit|<kind>|<value>`, the task id is appended per button.
#[must_use]
pub fn quick_edit_task_list(tasks: &[Task], staged: &str) -> InlineKeyboardMarkup {
    let rows = tasks
        .iter()
        .map(|task| {
            vec![InlineKeyboardButton::callback(
                task.title.clone(),
                format!("{staged}|{}", task.id),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Edit actions for the task-detail view.
#[must_use]
pub fn task_view_keyboard(task: &Task) -> InlineKeyboardMarkup {
    let id = task.id.to_string();
    let mut rows = vec![
        vec![
            InlineKeyboardButton::callback("Rename", CallbackPayload::encode("edit_name", &[&id])),
            InlineKeyboardButton::callback(
                "Description",
                CallbackPayload::encode("edit_desc", &[&id]),
            ),
            InlineKeyboardButton::callback("Deadline", CallbackPayload::encode("edit_end", &[&id])),
        ],
        vec![
            InlineKeyboardButton::callback("Group", CallbackPayload::encode("edit_group", &[&id])),
            InlineKeyboardButton::callback("Topic", CallbackPayload::encode("edit_topic", &[&id])),
        ],
        vec![
            InlineKeyboardButton::callback(
                "Assign user",
                CallbackPayload::encode("add_user", &[&id]),
            ),
            InlineKeyboardButton::callback(
                "Assignees",
                CallbackPayload::encode("view_task_users", &[&id]),
            ),
            InlineKeyboardButton::callback(
                "Remove users",
                CallbackPayload::encode("del_users", &[&id]),
            ),
        ],
        vec![
            InlineKeyboardButton::callback(
                "Attachments",
                CallbackPayload::encode("get_attachments", &[&id]),
            ),
            InlineKeyboardButton::callback(
                "Add attachment",
                CallbackPayload::encode("add_attachment", &[&id]),
            ),
        ],
    ];
    rows.push(status_row(task.id, task.status));
    rows.push(vec![InlineKeyboardButton::callback(
        "\u{1f5d1} Delete task",
        CallbackPayload::encode("delete_task", &[&id]),
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// One button per status, the current one marked.
#[must_use]
pub fn status_row(task_id: i64, current: TaskStatus) -> Vec<InlineKeyboardButton> {
    let id = task_id.to_string();
    TaskStatus::ALL
        .iter()
        .map(|status| {
            let label = if *status == current {
                format!("\u{2022} {}", status.label())
            } else {
                status.label().to_owned()
            };
            InlineKeyboardButton::callback(
                label,
                CallbackPayload::encode("change_status", &[&id, status.as_str()]),
            )
        })
        .collect()
}

/// Status buttons plus attachment access for the my-tasks view.
#[must_use]
pub fn my_task_keyboard(task: &Task) -> InlineKeyboardMarkup {
    let id = task.id.to_string();
    InlineKeyboardMarkup::new(vec![
        status_row(task.id, task.status),
        vec![
            InlineKeyboardButton::callback(
                "Attachments",
                CallbackPayload::encode("get_attachments", &[&id]),
            ),
            InlineKeyboardButton::callback(
                "Add attachment",
                CallbackPayload::encode("add_attachment", &[&id]),
            ),
        ],
    ])
}

/// Group browser: one button per group plus `Other` for ungrouped tasks.
#[must_use]
pub fn groups_keyboard(groups: &[Group]) -> InlineKeyboardMarkup {
    let mut rows = groups
        .iter()
        .map(|group| {
            vec![InlineKeyboardButton::callback(
                group.name.clone().unwrap_or_else(|| group.telegram_id.to_string()),
                CallbackPayload::encode("view_group", &[&group.id.to_string()]),
            )]
        })
        .collect::<Vec<_>>();
    rows.push(vec![InlineKeyboardButton::callback(
        "Other",
        CallbackPayload::encode("view_group", &["OTHER"]),
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Topic browser within a group, plus `Other` for topicless tasks.
#[must_use]
pub fn topics_keyboard(topics: &[Topic], group_id: i64) -> InlineKeyboardMarkup {
    let mut rows = topics
        .iter()
        .map(|topic| {
            vec![InlineKeyboardButton::callback(
                topic.name.clone().unwrap_or_else(|| topic.telegram_id.to_string()),
                CallbackPayload::encode("view_topic", &[&topic.id.to_string()]),
            )]
        })
        .collect::<Vec<_>>();
    rows.push(vec![InlineKeyboardButton::callback(
        "Other",
        CallbackPayload::encode("view_topic", &["OTHER", &group_id.to_string()]),
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// One button per candidate user for assignment, payload
/// `select_user|{user_id}|{task_id}`.
#[must_use]
pub fn assign_users_keyboard(users: &[User], task_id: i64) -> InlineKeyboardMarkup {
    let task = task_id.to_string();
    let mut rows = users
        .iter()
        .map(|user| {
            vec![InlineKeyboardButton::callback(
                user.username.clone(),
                CallbackPayload::encode("select_user", &[&user.id.to_string(), &task]),
            )]
        })
        .collect::<Vec<_>>();
    rows.push(vec![InlineKeyboardButton::callback(
        "Register new user",
        CallbackPayload::encode("register_user", &[&task]),
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// One button per assignee for removal, payload
/// `remove_user|{user_id}|{task_id}`.
#[must_use]
pub fn remove_users_keyboard(users: &[User], task_id: i64) -> InlineKeyboardMarkup {
    let task = task_id.to_string();
    let rows = users
        .iter()
        .map(|user| {
            vec![InlineKeyboardButton::callback(
                user.username.clone(),
                CallbackPayload::encode("remove_user", &[&user.id.to_string(), &task]),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// One button per user, payload `{action}|{user_id}`.
#[must_use]
pub fn users_keyboard(users: &[User], action: &str) -> InlineKeyboardMarkup {
    let rows = users
        .iter()
        .map(|user| {
            vec![InlineKeyboardButton::callback(
                user.username.clone(),
                CallbackPayload::encode(action, &[&user.id.to_string()]),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Actions on a single user in the management view.
#[must_use]
pub fn user_info_keyboard(user: &User) -> InlineKeyboardMarkup {
    let id = user.id.to_string();
    let toggle_label = if user.is_admin {
        "Revoke admin"
    } else {
        "Make admin"
    };
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(toggle_label, CallbackPayload::encode("toggle_admin", &[&id])),
        InlineKeyboardButton::callback(
            "\u{1f5d1} Delete user",
            CallbackPayload::encode("delete_user_final", &[&id]),
        ),
    ]])
}

/// Explicit terminal action for attachment collection mode.
#[must_use]
pub fn done_collecting_keyboard(task_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        texts::DONE_COLLECTING,
        CallbackPayload::encode("attach_done", &[&task_id.to_string()]),
    )]])
}

/// Single button closing a finished quick-edit picker.
#[must_use]
pub fn end_short_edit_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Finish",
        CallbackPayload::encode("end_short_edit", &[]),
    )]])
}
