//! Integration tests for the edit-field conversations.

use chrono::NaiveDate;
use teledo::dispatch;
use teledo::models::task::TaskStatus;
use teledo::persistence::task_repo::NewTask;
use teledo::state::{ConvKey, Flow};

use super::test_helpers::{private_callback, private_message, seed_admin, test_state};

async fn seeded_task(state: &teledo::app::AppState, admin_id: i64, title: &str) -> i64 {
    state
        .tasks()
        .create(NewTask {
            title: title.to_owned(),
            admin_id: Some(admin_id),
            ..NewTask::default()
        })
        .await
        .expect("task")
        .id
}

#[tokio::test]
async fn edit_name_button_enters_the_flow_and_text_applies_it() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id, "Old title").await;
    let key = ConvKey {
        chat_id: 10,
        user_id: 10,
    };

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("edit_name|{task_id}")),
        state.clone(),
    )
    .await;
    assert!(matches!(
        state.conversations.current(key).await,
        Some(Flow::WaitingForName { task_id: t, .. }) if t == task_id
    ));

    dispatch::handle_message(private_message(10, "boss", "New title"), state.clone()).await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.title, "New title");
    // Cleared on the success path.
    assert_eq!(state.conversations.current(key).await, None);
}

#[tokio::test]
async fn edit_desc_leaves_other_fields_alone() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id, "Stable title").await;

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("edit_desc|{task_id}")),
        state.clone(),
    )
    .await;
    dispatch::handle_message(private_message(10, "boss", "the details"), state.clone()).await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.title, "Stable title");
    assert_eq!(task.description.as_deref(), Some("the details"));
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn past_deadline_is_rejected_and_flow_cleared() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id, "Deadline task").await;
    let key = ConvKey {
        chat_id: 10,
        user_id: 10,
    };

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("edit_end|{task_id}")),
        state.clone(),
    )
    .await;
    dispatch::handle_message(private_message(10, "boss", "2020-01-01"), state.clone()).await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.end_date, None);
    // No retry loop: the failure cleared the flow too.
    assert_eq!(state.conversations.current(key).await, None);
}

#[tokio::test]
async fn unparseable_deadline_is_rejected_without_write() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id, "Deadline task").await;

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("edit_end|{task_id}")),
        state.clone(),
    )
    .await;
    dispatch::handle_message(private_message(10, "boss", "sometime soon"), state.clone()).await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.end_date, None);
}

#[tokio::test]
async fn future_deadline_is_applied() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id, "Deadline task").await;

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("edit_end|{task_id}")),
        state.clone(),
    )
    .await;
    dispatch::handle_message(private_message(10, "boss", "2999-12-31"), state.clone()).await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.end_date, NaiveDate::from_ymd_opt(2999, 12, 31));
}

#[tokio::test]
async fn group_rescope_by_name_clears_the_topic() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;

    let group_a = state
        .chats()
        .get_or_create_group(-1, Some("alpha"))
        .await
        .expect("group");
    let topic_a = state
        .chats()
        .get_or_create_topic(7, group_a.id, Some("thread"), None)
        .await
        .expect("topic");
    let group_b = state
        .chats()
        .get_or_create_group(-2, Some("beta"))
        .await
        .expect("group");

    let task = state
        .tasks()
        .create(NewTask {
            title: "Scoped".to_owned(),
            admin_id: Some(admin.id),
            group_id: Some(group_a.id),
            topic_id: Some(topic_a.id),
            ..NewTask::default()
        })
        .await
        .expect("task");

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("edit_group|{}", task.id)),
        state.clone(),
    )
    .await;
    dispatch::handle_message(private_message(10, "boss", "beta"), state.clone()).await;

    let rescoped = state.tasks().get_by_id(task.id).await.expect("query").expect("exists");
    assert_eq!(rescoped.group_id, Some(group_b.id));
    // Topic implies group: moving groups dropped the stale topic.
    assert_eq!(rescoped.topic_id, None);
}

#[tokio::test]
async fn topic_rescope_by_name_sets_the_owning_group_too() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;

    let group = state
        .chats()
        .get_or_create_group(-1, Some("alpha"))
        .await
        .expect("group");
    let topic = state
        .chats()
        .get_or_create_topic(7, group.id, Some("backend"), None)
        .await
        .expect("topic");
    let task_id = seeded_task(&state, admin.id, "Loose task").await;

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("edit_topic|{task_id}")),
        state.clone(),
    )
    .await;
    dispatch::handle_message(private_message(10, "boss", "backend"), state.clone()).await;

    let rescoped = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(rescoped.topic_id, Some(topic.id));
    assert_eq!(rescoped.group_id, Some(group.id));
}

#[tokio::test]
async fn delete_task_removes_it() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id, "Doomed").await;

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("delete_task|{task_id}")),
        state.clone(),
    )
    .await;

    assert!(state.tasks().get_by_id(task_id).await.expect("query").is_none());
}

#[tokio::test]
async fn malformed_task_id_in_callback_is_a_handled_error() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;

    // Neither panics nor writes anything.
    dispatch::handle_callback(private_callback(10, "boss", "edit_name|not-a-number"), state.clone())
        .await;
    dispatch::handle_callback(private_callback(10, "boss", "delete_task"), state.clone()).await;
    assert!(state.tasks().list_all().await.expect("query").is_empty());
}
