//! Unit tests for notification recipient selection and rendering.

use chrono::NaiveDate;
use teledo::models::attachment::AttachmentRef;
use teledo::models::task::TaskStatus;
use teledo::models::user::User;
use teledo::notify::{recipients, TaskChange};

fn user(id: i64, telegram_id: Option<i64>) -> User {
    User {
        id,
        telegram_id,
        username: format!("user-{id}"),
        is_admin: false,
    }
}

#[test]
fn recipients_skip_the_actor() {
    let users = vec![user(1, Some(10)), user(2, Some(20)), user(3, Some(30))];
    assert_eq!(recipients(&users, 20), vec![10, 30]);
}

#[test]
fn recipients_skip_unreachable_users() {
    let users = vec![user(1, Some(10)), user(2, None)];
    assert_eq!(recipients(&users, 99), vec![10]);
}

#[test]
fn recipients_empty_when_only_the_actor_is_assigned() {
    let users = vec![user(1, Some(10))];
    assert!(recipients(&users, 10).is_empty());
}

#[test]
fn change_descriptions_name_the_specific_change() {
    assert_eq!(
        TaskChange::Renamed("Ship".to_owned()).describe(),
        "renamed to \u{201c}Ship\u{201d}"
    );
    assert_eq!(
        TaskChange::StatusChanged(TaskStatus::Done).describe(),
        "status changed to Done"
    );
    let date = NaiveDate::from_ymd_opt(2026, 4, 4).expect("valid date");
    assert_eq!(
        TaskChange::DeadlineChanged(date).describe(),
        "deadline set to 1405-01-15"
    );
}

#[test]
fn attachment_notice_names_only_the_new_item() {
    let change = TaskChange::NewAttachment(AttachmentRef::Text("the report".to_owned()));
    let described = change.describe();
    assert!(described.contains("the report"));
    assert!(described.starts_with("new attachment"));
}
