//! Integration tests for status changes by admins and assignees.

use teledo::dispatch;
use teledo::models::task::TaskStatus;
use teledo::persistence::task_repo::NewTask;

use super::test_helpers::{private_callback, seed_admin, seed_user, test_state};

async fn seeded_task(state: &teledo::app::AppState, admin_id: i64) -> i64 {
    state
        .tasks()
        .create(NewTask {
            title: "Ship release".to_owned(),
            admin_id: Some(admin_id),
            ..NewTask::default()
        })
        .await
        .expect("task")
        .id
}

#[tokio::test]
async fn assignee_updates_status_to_done() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let worker = seed_user(&state, 20, "worker").await;
    let task_id = seeded_task(&state, admin.id).await;
    state.users().assign(worker.id, task_id).await.expect("assign");

    dispatch::handle_callback(
        private_callback(20, "worker", &format!("change_status|{task_id}|done")),
        state.clone(),
    )
    .await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.status, TaskStatus::Done);
}

#[tokio::test]
async fn admin_updates_status_without_assignment() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id).await;

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("change_status|{task_id}|blocked")),
        state.clone(),
    )
    .await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.status, TaskStatus::Blocked);
}

#[tokio::test]
async fn unassigned_non_admin_cannot_change_status() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    seed_user(&state, 30, "bystander").await;
    let task_id = seeded_task(&state, admin.id).await;

    dispatch::handle_callback(
        private_callback(30, "bystander", &format!("change_status|{task_id}|done")),
        state.clone(),
    )
    .await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn invalid_status_token_leaves_the_row_untouched() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let task_id = seeded_task(&state, admin.id).await;

    dispatch::handle_callback(
        private_callback(10, "boss", &format!("change_status|{task_id}|not_a_real_status")),
        state.clone(),
    )
    .await;

    let task = state.tasks().get_by_id(task_id).await.expect("query").expect("exists");
    assert_eq!(task.status, TaskStatus::Pending);
}

#[tokio::test]
async fn status_change_on_missing_task_is_handled() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;

    dispatch::handle_callback(
        private_callback(10, "boss", "change_status|424242|done"),
        state.clone(),
    )
    .await;
    // Nothing to assert beyond "did not blow up and wrote nothing".
    assert!(state.tasks().list_all().await.expect("query").is_empty());
}
