//! Ephemeral conversation state keyed per (chat, user).
//!
//! Multi-step flows (add-task, edit-field, attachment collection) park
//! their progress here between messages. Entering a flow supersedes any
//! previous entry for the same key wholesale, so stale payload fields
//! cannot leak into a new flow. A background sweeper expires entries that
//! sat untouched past the TTL — a user who starts a flow and never
//! replies does not pin state forever.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A chat message coordinate used for in-place edits and cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    /// Chat the message lives in.
    pub chat_id: i64,
    /// Message id within the chat.
    pub message_id: i32,
}

/// Named flow token plus the payload each flow needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Add-task: waiting for the title text.
    WaitingForTitle,
    /// Add-task: title collected, waiting for submit / add-details.
    ConfirmingTask {
        /// Staged task title.
        title: String,
    },
    /// Waiting for a new task title.
    WaitingForName {
        /// Target task.
        task_id: i64,
        /// Message to re-render in place.
        origin: MessageRef,
    },
    /// Waiting for a new task description.
    WaitingForDesc {
        /// Target task.
        task_id: i64,
        /// Message to re-render in place.
        origin: MessageRef,
    },
    /// Waiting for a new deadline.
    WaitingForDeadline {
        /// Target task.
        task_id: i64,
        /// Message to re-render in place.
        origin: MessageRef,
    },
    /// Waiting for a group display name to rescope the task.
    WaitingForGroupName {
        /// Target task.
        task_id: i64,
        /// Message to re-render in place.
        origin: MessageRef,
    },
    /// Waiting for a topic display name to rescope the task.
    WaitingForTopicName {
        /// Target task.
        task_id: i64,
        /// Message to re-render in place.
        origin: MessageRef,
    },
    /// Waiting for a display name to register (and optionally assign).
    WaitingForUsername {
        /// Task to assign the new user to, when entered from a task view.
        task_id: Option<i64>,
    },
    /// Capturing every media-bearing message as a task attachment until
    /// the explicit done button or TTL expiry.
    CollectingAttachments {
        /// Target task.
        task_id: i64,
    },
}

/// One active conversation for a (chat, user) key.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Current flow token and payload.
    pub flow: Flow,
    /// Transient messages to delete on cancel/completion.
    pub cleanup: Vec<MessageRef>,
    /// Last touch time, for TTL sweeping.
    pub touched_at: Instant,
}

/// Store key: conversations are independent per chat *and* per user, so
/// two users in one group never interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConvKey {
    /// Chat id.
    pub chat_id: i64,
    /// Acting user id.
    pub user_id: i64,
}

/// In-memory conversation store with TTL expiry.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<Mutex<HashMap<ConvKey, Conversation>>>,
    ttl: Duration,
}

impl ConversationStore {
    /// Create a store whose entries expire after `ttl` of inactivity.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Enter a flow, superseding any previous conversation for the key.
    pub async fn enter(&self, key: ConvKey, flow: Flow) {
        let mut inner = self.inner.lock().await;
        debug!(chat_id = key.chat_id, user_id = key.user_id, ?flow, "entering flow");
        inner.insert(
            key,
            Conversation {
                flow,
                cleanup: Vec::new(),
                touched_at: Instant::now(),
            },
        );
    }

    /// Current flow for the key, refreshing the TTL touch time.
    pub async fn current(&self, key: ConvKey) -> Option<Flow> {
        let mut inner = self.inner.lock().await;
        let conv = inner.get_mut(&key)?;
        conv.touched_at = Instant::now();
        Some(conv.flow.clone())
    }

    /// Record a transient message for cleanup on cancel.
    ///
    /// No-op when no conversation is active for the key.
    pub async fn track_cleanup(&self, key: ConvKey, message: MessageRef) {
        let mut inner = self.inner.lock().await;
        if let Some(conv) = inner.get_mut(&key) {
            conv.cleanup.push(message);
        }
    }

    /// Clear the conversation, returning it (cleanup list included) so the
    /// caller can delete the accumulated messages.
    pub async fn clear(&self, key: ConvKey) -> Option<Conversation> {
        let mut inner = self.inner.lock().await;
        inner.remove(&key)
    }

    /// Drop entries untouched for longer than the TTL.
    ///
    /// Returns the number of swept conversations.
    pub async fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.len();
        inner.retain(|_, conv| conv.touched_at.elapsed() < self.ttl);
        before - inner.len()
    }

    /// Spawn the background sweeper; runs until cancelled.
    #[must_use]
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        let period = store.ttl.min(Duration::from_secs(60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("conversation sweeper shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let swept = store.sweep_expired().await;
                        if swept > 0 {
                            info!(swept, "swept stale conversations");
                        }
                    }
                }
            }
        })
    }
}
