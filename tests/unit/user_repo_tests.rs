//! Unit tests for `UserRepo` records and assignments.

use teledo::persistence::task_repo::{NewTask, TaskRepo};
use teledo::persistence::user_repo::UserRepo;
use teledo::persistence::{db, MutationOutcome};

async fn repos() -> (UserRepo, TaskRepo) {
    let db = db::connect_memory().await.expect("db");
    (UserRepo::new(db.clone()), TaskRepo::new(db))
}

#[tokio::test]
async fn get_or_create_registers_a_new_user() {
    let (users, _) = repos().await;
    let user = users.get_or_create("alice", Some(100), false).await.expect("create");
    assert_eq!(user.username, "alice");
    assert_eq!(user.telegram_id, Some(100));
    assert!(!user.is_admin);

    let fetched = users.get_by_telegram_id(100).await.expect("query").expect("exists");
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn get_or_create_is_promote_only() {
    let (users, _) = repos().await;
    let admin = users.get_or_create("boss", Some(1), true).await.expect("create");
    assert!(admin.is_admin);

    // Re-creation without the flag never demotes.
    let again = users.get_or_create("boss", Some(1), false).await.expect("lookup");
    assert_eq!(again.id, admin.id);
    assert!(again.is_admin);
}

#[tokio::test]
async fn get_or_create_syncs_display_name_and_telegram_id() {
    let (users, _) = repos().await;
    // Pre-registered by name only.
    let registered = users.get_or_create("charlie", None, false).await.expect("create");
    assert_eq!(registered.telegram_id, None);

    // First contact fills in the platform id.
    let contacted = users.get_or_create("charlie", Some(300), false).await.expect("sync");
    assert_eq!(contacted.id, registered.id);
    assert_eq!(contacted.telegram_id, Some(300));

    // A later rename is synced on the next lookup by id.
    let renamed = users.get_or_create("charles", Some(300), false).await.expect("sync");
    assert_eq!(renamed.id, registered.id);
    assert_eq!(renamed.username, "charles");
    let fetched = users.get_by_telegram_id(300).await.expect("query").expect("exists");
    assert_eq!(fetched.username, "charles");
}

#[tokio::test]
async fn is_admin_is_none_for_unknown_users() {
    let (users, _) = repos().await;
    assert_eq!(users.is_admin(999).await.expect("query"), None);
    users.get_or_create("dave", Some(999), false).await.expect("create");
    assert_eq!(users.is_admin(999).await.expect("query"), Some(false));
}

#[tokio::test]
async fn toggle_admin_flips_both_ways() {
    let (users, _) = repos().await;
    let user = users.get_or_create("eve", Some(5), false).await.expect("create");

    assert_eq!(users.toggle_admin(user.id).await.expect("toggle"), MutationOutcome::Applied);
    assert_eq!(users.is_admin(5).await.expect("query"), Some(true));

    assert_eq!(users.toggle_admin(user.id).await.expect("toggle"), MutationOutcome::Applied);
    assert_eq!(users.is_admin(5).await.expect("query"), Some(false));
}

#[tokio::test]
async fn toggle_admin_missing_user_is_not_exist() {
    let (users, _) = repos().await;
    assert_eq!(users.toggle_admin(42).await.expect("toggle"), MutationOutcome::NotExist);
}

#[tokio::test]
async fn assign_twice_leaves_one_row() {
    let (users, tasks) = repos().await;
    let user = users.get_or_create("frank", Some(6), false).await.expect("create");
    let task = tasks
        .create(NewTask {
            title: "Ship release".to_owned(),
            ..NewTask::default()
        })
        .await
        .expect("task");

    users.assign(user.id, task.id).await.expect("assign");
    users.assign(user.id, task.id).await.expect("assign again");

    let assigned = tasks.users_for_task(task.id).await.expect("query");
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].id, user.id);
}

#[tokio::test]
async fn remove_assignment_distinguishes_missing_rows() {
    let (users, tasks) = repos().await;
    let user = users.get_or_create("grace", Some(7), false).await.expect("create");
    let task = tasks
        .create(NewTask {
            title: "Write docs".to_owned(),
            ..NewTask::default()
        })
        .await
        .expect("task");

    // No assignment yet.
    assert_eq!(
        users.remove_assignment(task.id, user.id).await.expect("remove"),
        MutationOutcome::NotExist
    );

    users.assign(user.id, task.id).await.expect("assign");
    assert_eq!(
        users.remove_assignment(task.id, user.id).await.expect("remove"),
        MutationOutcome::Applied
    );

    // Exactly that row went away; a repeat is NotExist again.
    assert_eq!(
        users.remove_assignment(task.id, user.id).await.expect("remove"),
        MutationOutcome::NotExist
    );
}

#[tokio::test]
async fn list_excluding_filters_telegram_id_and_assignees() {
    let (users, tasks) = repos().await;
    let actor = users.get_or_create("actor", Some(1), true).await.expect("create");
    let assigned = users.get_or_create("assigned", Some(2), false).await.expect("create");
    let free = users.get_or_create("free", Some(3), false).await.expect("create");
    let unreachable = users.get_or_create("ghost", None, false).await.expect("create");

    let task = tasks
        .create(NewTask {
            title: "Task".to_owned(),
            admin_id: Some(actor.id),
            ..NewTask::default()
        })
        .await
        .expect("task");
    users.assign(assigned.id, task.id).await.expect("assign");

    let candidates = users
        .list_excluding(Some(1), Some(task.id))
        .await
        .expect("query");
    let ids: Vec<i64> = candidates.iter().map(|u| u.id).collect();
    assert!(ids.contains(&free.id));
    assert!(ids.contains(&unreachable.id));
    assert!(!ids.contains(&actor.id));
    assert!(!ids.contains(&assigned.id));
}

#[tokio::test]
async fn delete_user_cascades_assignments() {
    let (users, tasks) = repos().await;
    let user = users.get_or_create("henry", Some(8), false).await.expect("create");
    let task = tasks
        .create(NewTask {
            title: "Cleanup".to_owned(),
            ..NewTask::default()
        })
        .await
        .expect("task");
    users.assign(user.id, task.id).await.expect("assign");

    assert_eq!(users.delete(user.id).await.expect("delete"), MutationOutcome::Applied);
    assert!(tasks.users_for_task(task.id).await.expect("query").is_empty());
    assert_eq!(users.delete(user.id).await.expect("delete"), MutationOutcome::NotExist);
}
