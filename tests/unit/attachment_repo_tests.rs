//! Unit tests for `AttachmentRepo` dedup semantics.

use teledo::persistence::attachment_repo::AttachmentRepo;
use teledo::persistence::task_repo::{NewTask, TaskRepo};
use teledo::persistence::db;

async fn setup() -> (AttachmentRepo, i64) {
    let db = db::connect_memory().await.expect("db");
    let tasks = TaskRepo::new(db.clone());
    let task = tasks
        .create(NewTask {
            title: "Carrier".to_owned(),
            ..NewTask::default()
        })
        .await
        .expect("task");
    (AttachmentRepo::new(db), task.id)
}

#[tokio::test]
async fn empty_task_has_no_attachments() {
    let (repo, task_id) = setup().await;
    assert!(repo.list(task_id).await.expect("query").is_empty());
}

#[tokio::test]
async fn add_is_idempotent_per_reference() {
    let (repo, task_id) = setup().await;

    // First add appends and reports true.
    assert!(repo.add(task_id, "file-1").await.expect("add"));
    assert_eq!(repo.list(task_id).await.expect("query").len(), 1);

    // The same reference again is a no-op, not an error.
    assert!(!repo.add(task_id, "file-1").await.expect("re-add"));
    assert_eq!(repo.list(task_id).await.expect("query").len(), 1);
}

#[tokio::test]
async fn distinct_references_accumulate_in_order() {
    let (repo, task_id) = setup().await;
    assert!(repo.add(task_id, "file-1").await.expect("add"));
    assert!(repo.add(task_id, "text:see the brief").await.expect("add"));
    assert!(repo.add(task_id, "file-2").await.expect("add"));

    let stored = repo.list(task_id).await.expect("query");
    assert_eq!(
        stored,
        vec![
            "file-1".to_owned(),
            "text:see the brief".to_owned(),
            "file-2".to_owned()
        ]
    );
}

#[tokio::test]
async fn text_and_file_refs_with_same_payload_are_distinct() {
    let (repo, task_id) = setup().await;
    assert!(repo.add(task_id, "notes").await.expect("add"));
    assert!(repo.add(task_id, "text:notes").await.expect("add"));
    assert_eq!(repo.list(task_id).await.expect("query").len(), 2);
}
