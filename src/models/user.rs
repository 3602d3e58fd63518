//! User identity record.

use serde::{Deserialize, Serialize};

/// A known person: an admin or a (potential) assignee.
///
/// `telegram_id` is nullable — an admin may pre-register a user by display
/// name before that person ever talks to the bot. The display name is the
/// lookup key while the platform id is absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct User {
    /// Internal database identifier.
    pub id: i64,
    /// Telegram user id, unique when present.
    pub telegram_id: Option<i64>,
    /// Display name; lookup key when `telegram_id` is absent.
    pub username: String,
    /// Whether this user may manage tasks in private chats.
    pub is_admin: bool,
}

impl User {
    /// Whether the bot can reach this user with a direct message.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.telegram_id.is_some()
    }
}
