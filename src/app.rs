//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::config::GlobalConfig;
use crate::janitor;
use crate::media::MediaCache;
use crate::persistence::attachment_repo::AttachmentRepo;
use crate::persistence::chat_repo::ChatRepo;
use crate::persistence::db::Database;
use crate::persistence::task_repo::TaskRepo;
use crate::persistence::user_repo::UserRepo;
use crate::state::{ConversationStore, MessageRef};
use crate::telegram::TelegramService;

/// Shared application state.
///
/// `telegram` is `None` in tests — handlers mutate persistence and
/// conversation state the same way and skip the outbound sends.
pub struct AppState {
    /// Parsed configuration.
    pub config: Arc<GlobalConfig>,
    /// `SQLite` pool.
    pub db: Database,
    /// Bot API wrapper; absent under test.
    pub telegram: Option<Arc<TelegramService>>,
    /// Per-(chat, user) conversation flows.
    pub conversations: ConversationStore,
    /// TTL cache for staged `/attach` media.
    pub media: MediaCache,
}

impl AppState {
    /// Build state from config and an open database pool.
    #[must_use]
    pub fn new(
        config: Arc<GlobalConfig>,
        db: Database,
        telegram: Option<Arc<TelegramService>>,
    ) -> Self {
        let conversations =
            ConversationStore::new(Duration::from_secs(config.ttl.conversation_seconds));
        let media = MediaCache::new(Duration::from_secs(config.ttl.media_seconds));
        Self {
            config,
            db,
            telegram,
            conversations,
            media,
        }
    }

    /// User repository over the shared pool.
    #[must_use]
    pub fn users(&self) -> UserRepo {
        UserRepo::new(self.db.clone())
    }

    /// Task repository over the shared pool.
    #[must_use]
    pub fn tasks(&self) -> TaskRepo {
        TaskRepo::new(self.db.clone())
    }

    /// Group/topic repository over the shared pool.
    #[must_use]
    pub fn chats(&self) -> ChatRepo {
        ChatRepo::new(self.db.clone())
    }

    /// Attachment repository over the shared pool.
    #[must_use]
    pub fn attachments(&self) -> AttachmentRepo {
        AttachmentRepo::new(self.db.clone())
    }

    /// Schedule best-effort deletion of transient messages after the
    /// configured delay. No-op under test.
    pub fn schedule_cleanup(&self, targets: Vec<MessageRef>) {
        if let Some(telegram) = &self.telegram {
            let delay = Duration::from_secs(self.config.ttl.cleanup_delay_seconds);
            let _ = janitor::schedule_delete(Arc::clone(telegram), delay, targets);
        }
    }
}
