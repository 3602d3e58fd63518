//! Group and topic containers mirroring Telegram chats and forum threads.

use serde::{Deserialize, Serialize};

/// A Telegram group or supergroup the bot has been used in.
///
/// Created lazily the first time a task is scoped to the chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    /// Internal database identifier.
    pub id: i64,
    /// Telegram chat id, unique.
    pub telegram_id: i64,
    /// Chat title as last observed.
    pub name: Option<String>,
}

/// A forum topic (sub-thread) within a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Topic {
    /// Internal database identifier.
    pub id: i64,
    /// Telegram message-thread id; unique per owning group.
    pub telegram_id: i64,
    /// Owning group.
    pub group_id: i64,
    /// Topic title as last observed.
    pub name: Option<String>,
    /// Shareable t.me deep link to the thread.
    pub link: Option<String>,
}
