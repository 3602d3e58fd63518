//! Transient-message janitor.
//!
//! Ephemeral confirmations and error notices are deleted after a short
//! delay. Deletion is best-effort — a message the user already removed,
//! or one past the platform's deletion window, is counted and logged,
//! never escalated.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::state::MessageRef;
use crate::telegram::TelegramService;

/// Delete `targets` after `delay`, swallowing individual failures.
pub fn schedule_delete(
    telegram: Arc<TelegramService>,
    delay: Duration,
    targets: Vec<MessageRef>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut failures = 0usize;
        for target in targets {
            if telegram.delete(target).await.is_err() {
                failures += 1;
            }
        }
        if failures > 0 {
            warn!(failures, "failed to delete transient messages");
        }
    })
}
