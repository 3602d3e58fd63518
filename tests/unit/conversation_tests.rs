//! Unit tests for the conversation store.

use std::time::Duration;

use teledo::state::{ConvKey, ConversationStore, Flow, MessageRef};

fn key(chat_id: i64, user_id: i64) -> ConvKey {
    ConvKey { chat_id, user_id }
}

fn msg(chat_id: i64, message_id: i32) -> MessageRef {
    MessageRef { chat_id, message_id }
}

#[tokio::test]
async fn enter_then_current_returns_the_flow() {
    let store = ConversationStore::new(Duration::from_secs(60));
    store.enter(key(1, 2), Flow::WaitingForTitle).await;
    assert_eq!(store.current(key(1, 2)).await, Some(Flow::WaitingForTitle));
}

#[tokio::test]
async fn keys_are_independent_per_chat_and_user() {
    let store = ConversationStore::new(Duration::from_secs(60));
    store.enter(key(1, 2), Flow::WaitingForTitle).await;
    assert_eq!(store.current(key(1, 3)).await, None);
    assert_eq!(store.current(key(2, 2)).await, None);
}

#[tokio::test]
async fn entering_a_new_flow_supersedes_the_old_one_wholesale() {
    let store = ConversationStore::new(Duration::from_secs(60));
    store
        .enter(
            key(1, 2),
            Flow::WaitingForName {
                task_id: 7,
                origin: msg(1, 100),
            },
        )
        .await;
    store.track_cleanup(key(1, 2), msg(1, 101)).await;

    store.enter(key(1, 2), Flow::WaitingForTitle).await;
    assert_eq!(store.current(key(1, 2)).await, Some(Flow::WaitingForTitle));

    // The superseded payload is gone: clearing yields an empty cleanup list.
    let cleared = store.clear(key(1, 2)).await.expect("conversation present");
    assert!(cleared.cleanup.is_empty());
}

#[tokio::test]
async fn clear_returns_accumulated_cleanup_messages() {
    let store = ConversationStore::new(Duration::from_secs(60));
    store.enter(key(1, 2), Flow::WaitingForTitle).await;
    store.track_cleanup(key(1, 2), msg(1, 10)).await;
    store.track_cleanup(key(1, 2), msg(1, 11)).await;

    let cleared = store.clear(key(1, 2)).await.expect("conversation present");
    assert_eq!(cleared.cleanup, vec![msg(1, 10), msg(1, 11)]);
    assert_eq!(store.current(key(1, 2)).await, None);
}

#[tokio::test]
async fn clear_on_empty_store_is_none() {
    let store = ConversationStore::new(Duration::from_secs(60));
    assert!(store.clear(key(9, 9)).await.is_none());
}

#[tokio::test]
async fn track_cleanup_without_flow_is_a_no_op() {
    let store = ConversationStore::new(Duration::from_secs(60));
    store.track_cleanup(key(1, 2), msg(1, 10)).await;
    assert!(store.clear(key(1, 2)).await.is_none());
}

#[tokio::test]
async fn sweeper_drops_stale_entries() {
    let store = ConversationStore::new(Duration::from_millis(10));
    store.enter(key(1, 2), Flow::CollectingAttachments { task_id: 3 }).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let swept = store.sweep_expired().await;
    assert_eq!(swept, 1);
    assert_eq!(store.current(key(1, 2)).await, None);
}

#[tokio::test]
async fn sweeper_keeps_fresh_entries() {
    let store = ConversationStore::new(Duration::from_secs(60));
    store.enter(key(1, 2), Flow::WaitingForTitle).await;
    assert_eq!(store.sweep_expired().await, 0);
    assert_eq!(store.current(key(1, 2)).await, Some(Flow::WaitingForTitle));
}
