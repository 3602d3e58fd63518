//! Unit tests for the staged-media TTL cache.

use std::time::Duration;

use teledo::media::MediaCache;

#[tokio::test]
async fn stage_then_take_returns_refs_once() {
    let cache = MediaCache::new(Duration::from_secs(60));
    let key = cache.stage(vec!["file-1".to_owned(), "file-2".to_owned()]).await;

    let refs = cache.take(&key).await.expect("staged entry present");
    assert_eq!(refs, vec!["file-1".to_owned(), "file-2".to_owned()]);

    // An entry is consumed exactly once.
    assert!(cache.take(&key).await.is_none());
}

#[tokio::test]
async fn keys_are_unique_per_stage() {
    let cache = MediaCache::new(Duration::from_secs(60));
    let a = cache.stage(vec!["x".to_owned()]).await;
    let b = cache.stage(vec!["y".to_owned()]).await;
    assert_ne!(a, b);
}

#[tokio::test]
async fn take_unknown_key_is_none() {
    let cache = MediaCache::new(Duration::from_secs(60));
    assert!(cache.take("no-such-key").await.is_none());
}

#[tokio::test]
async fn sweeper_drops_expired_entries() {
    let cache = MediaCache::new(Duration::from_millis(10));
    let key = cache.stage(vec!["file-1".to_owned()]).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(cache.sweep_expired().await, 1);
    assert!(cache.take(&key).await.is_none());
}

#[tokio::test]
async fn sweeper_keeps_fresh_entries() {
    let cache = MediaCache::new(Duration::from_secs(60));
    let key = cache.stage(vec!["file-1".to_owned()]).await;
    assert_eq!(cache.sweep_expired().await, 0);
    assert!(cache.take(&key).await.is_some());
}
