//! Integration tests for the add-task conversation.

use teledo::dispatch;
use teledo::models::task::TaskStatus;
use teledo::state::{ConvKey, Flow};
use teledo::telegram::ReplyInfo;

use super::test_helpers::{
    group_message, group_reply, private_callback, private_message, seed_admin, test_state,
};

#[tokio::test]
async fn private_add_walks_title_then_confirm() {
    let state = test_state().await;
    let admin = seed_admin(&state, 10, "boss").await;
    let key = ConvKey {
        chat_id: 10,
        user_id: 10,
    };

    // /add without a title opens the title prompt.
    dispatch::handle_message(private_message(10, "boss", "/add"), state.clone()).await;
    assert_eq!(state.conversations.current(key).await, Some(Flow::WaitingForTitle));

    // Free text advances to the confirmation step.
    dispatch::handle_message(private_message(10, "boss", "Ship release"), state.clone()).await;
    assert_eq!(
        state.conversations.current(key).await,
        Some(Flow::ConfirmingTask {
            title: "Ship release".to_owned()
        })
    );
    // Nothing is persisted until the confirmation.
    assert!(state.tasks().list_all().await.expect("query").is_empty());

    // Submit creates the task and clears the flow.
    dispatch::handle_callback(
        private_callback(10, "boss", "confirm_task|submit"),
        state.clone(),
    )
    .await;

    let tasks = state.tasks().list_all().await.expect("query");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Ship release");
    assert_eq!(tasks[0].status, TaskStatus::Pending);
    assert_eq!(tasks[0].admin_id, Some(admin.id));
    assert_eq!(state.conversations.current(key).await, None);
}

#[tokio::test]
async fn add_details_also_creates_the_task() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;

    dispatch::handle_message(private_message(10, "boss", "/add"), state.clone()).await;
    dispatch::handle_message(private_message(10, "boss", "Write docs"), state.clone()).await;
    dispatch::handle_callback(
        private_callback(10, "boss", "confirm_task|details"),
        state.clone(),
    )
    .await;

    let tasks = state.tasks().list_all().await.expect("query");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Write docs");
    let key = ConvKey {
        chat_id: 10,
        user_id: 10,
    };
    assert_eq!(state.conversations.current(key).await, None);
}

#[tokio::test]
async fn cancel_mid_flow_creates_nothing() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;
    let key = ConvKey {
        chat_id: 10,
        user_id: 10,
    };

    dispatch::handle_message(private_message(10, "boss", "/add"), state.clone()).await;
    assert!(state.conversations.current(key).await.is_some());

    dispatch::handle_message(
        private_message(10, "boss", teledo::texts::CANCEL_LABEL),
        state.clone(),
    )
    .await;

    // Flow cleared, no task persisted.
    assert_eq!(state.conversations.current(key).await, None);
    assert!(state.tasks().list_all().await.expect("query").is_empty());

    // Subsequent free text is a fresh, unrelated message.
    dispatch::handle_message(private_message(10, "boss", "Ship release"), state.clone()).await;
    assert_eq!(state.conversations.current(key).await, None);
    assert!(state.tasks().list_all().await.expect("query").is_empty());
}

#[tokio::test]
async fn stale_confirm_button_is_harmless() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;

    // Confirm without any staged conversation.
    dispatch::handle_callback(
        private_callback(10, "boss", "confirm_task|submit"),
        state.clone(),
    )
    .await;
    assert!(state.tasks().list_all().await.expect("query").is_empty());
}

#[tokio::test]
async fn group_add_with_inline_title_scopes_to_the_chat() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;

    dispatch::handle_message(
        group_message(-500, 10, "boss", "/add Fix the build"),
        state.clone(),
    )
    .await;

    let tasks = state.tasks().list_all().await.expect("query");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Fix the build");

    // The group record was created lazily and the task scoped to it.
    let group = state
        .chats()
        .get_group_by_telegram_id(-500)
        .await
        .expect("query")
        .expect("group created");
    assert_eq!(tasks[0].group_id, Some(group.id));
}

#[tokio::test]
async fn group_add_takes_the_title_from_the_replied_message() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;

    dispatch::handle_message(
        group_reply(
            -500,
            10,
            "boss",
            "/add",
            ReplyInfo {
                text: Some("Deploy on Friday".to_owned()),
                media: Vec::new(),
                author_name: Some("alice".to_owned()),
            },
        ),
        state.clone(),
    )
    .await;

    let tasks = state.tasks().list_all().await.expect("query");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Deploy on Friday");
}

#[tokio::test]
async fn restaging_the_title_before_confirm_uses_the_latest_text() {
    let state = test_state().await;
    seed_admin(&state, 10, "boss").await;

    dispatch::handle_message(private_message(10, "boss", "/add"), state.clone()).await;
    dispatch::handle_message(private_message(10, "boss", "First title"), state.clone()).await;
    dispatch::handle_message(private_message(10, "boss", "Second title"), state.clone()).await;
    dispatch::handle_callback(
        private_callback(10, "boss", "confirm_task|submit"),
        state.clone(),
    )
    .await;

    let tasks = state.tasks().list_all().await.expect("query");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Second title");
}
