//! Shared helpers for handler-level integration tests.
//!
//! Builds an `AppState` backed by in-memory `SQLite` with no Telegram
//! client attached — handlers mutate persistence and conversation state
//! exactly as in production and skip the outbound sends.

use std::sync::Arc;

use teledo::app::AppState;
use teledo::config::GlobalConfig;
use teledo::models::user::User;
use teledo::persistence::db;
use teledo::state::MessageRef;
use teledo::telegram::{Actor, CallbackEvent, ChatContext, ChatKind, MessageEvent, ReplyInfo};

/// Build a minimal config suitable for tests.
pub fn test_config() -> GlobalConfig {
    GlobalConfig::from_toml_str("database_path = ':memory:'").expect("valid test config")
}

/// Build shared state over in-memory `SQLite`, without Telegram.
pub async fn test_state() -> Arc<AppState> {
    let config = Arc::new(test_config());
    let db = db::connect_memory().await.expect("db");
    Arc::new(AppState::new(config, db, None))
}

/// Register a user with the stored admin flag set.
pub async fn seed_admin(state: &AppState, telegram_id: i64, name: &str) -> User {
    state
        .users()
        .get_or_create(name, Some(telegram_id), true)
        .await
        .expect("seed admin")
}

/// Register a plain user.
pub async fn seed_user(state: &AppState, telegram_id: i64, name: &str) -> User {
    state
        .users()
        .get_or_create(name, Some(telegram_id), false)
        .await
        .expect("seed user")
}

fn chat(chat_id: i64, kind: ChatKind) -> ChatContext {
    ChatContext {
        chat_id,
        kind,
        thread_id: None,
        title: Some("Test chat".to_owned()),
    }
}

fn actor(telegram_id: i64, name: &str) -> Actor {
    Actor {
        telegram_id,
        display_name: name.to_owned(),
    }
}

/// A private-chat text message.
pub fn private_message(user_id: i64, name: &str, text: &str) -> MessageEvent {
    MessageEvent {
        chat: chat(user_id, ChatKind::Private),
        actor: actor(user_id, name),
        message_id: 1,
        text: Some(text.to_owned()),
        media: Vec::new(),
        reply: None,
    }
}

/// A group-chat text message.
pub fn group_message(chat_id: i64, user_id: i64, name: &str, text: &str) -> MessageEvent {
    MessageEvent {
        chat: chat(chat_id, ChatKind::Supergroup),
        actor: actor(user_id, name),
        message_id: 1,
        text: Some(text.to_owned()),
        media: Vec::new(),
        reply: None,
    }
}

/// A group-chat message replying to another message.
pub fn group_reply(
    chat_id: i64,
    user_id: i64,
    name: &str,
    text: &str,
    reply: ReplyInfo,
) -> MessageEvent {
    MessageEvent {
        reply: Some(reply),
        ..group_message(chat_id, user_id, name, text)
    }
}

/// A media-bearing private message.
pub fn media_message(user_id: i64, name: &str, file_ids: &[&str]) -> MessageEvent {
    MessageEvent {
        chat: chat(user_id, ChatKind::Private),
        actor: actor(user_id, name),
        message_id: 2,
        text: None,
        media: file_ids.iter().map(|s| (*s).to_owned()).collect(),
        reply: None,
    }
}

/// An inline-button press in a private chat.
pub fn private_callback(user_id: i64, name: &str, data: &str) -> CallbackEvent {
    CallbackEvent {
        callback_id: "cb-1".to_owned(),
        chat: chat(user_id, ChatKind::Private),
        actor: actor(user_id, name),
        origin: MessageRef {
            chat_id: user_id,
            message_id: 50,
        },
        data: data.to_owned(),
    }
}
