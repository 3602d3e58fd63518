//! Inbound event sum type.
//!
//! Handlers work against [`ChatEvent`] — a message or an inline-button
//! press with uniform accessors — instead of branching on raw update
//! shapes. Conversion from `teloxide` types happens once, at the
//! dispatcher edge, so tests construct events as plain data.

use teloxide::types::{CallbackQuery, MaybeInaccessibleMessage, Message};

use crate::state::{ConvKey, MessageRef};

/// What kind of chat an event arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    /// One-on-one chat with the bot.
    Private,
    /// Basic group.
    Group,
    /// Supergroup (possibly a forum with topics).
    Supergroup,
}

impl ChatKind {
    /// Whether this is a group or supergroup chat.
    #[must_use]
    pub fn is_group_like(self) -> bool {
        matches!(self, Self::Group | Self::Supergroup)
    }
}

/// The chat an event arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContext {
    /// Telegram chat id.
    pub chat_id: i64,
    /// Private / group / supergroup.
    pub kind: ChatKind,
    /// Forum thread id when the event came from a topic.
    pub thread_id: Option<i64>,
    /// Chat title, for lazily registering groups.
    pub title: Option<String>,
}

/// The person who triggered an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Telegram user id.
    pub telegram_id: i64,
    /// Best available display name (@username or full name).
    pub display_name: String,
}

/// The message a command was a reply to, for reply-sourced arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyInfo {
    /// Text of the replied-to message.
    pub text: Option<String>,
    /// File ids of any media the replied-to message carried.
    pub media: Vec<String>,
    /// Display name of the replied-to message's author.
    pub author_name: Option<String>,
}

/// An inbound text (or media) message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Originating chat.
    pub chat: ChatContext,
    /// Sender.
    pub actor: Actor,
    /// Message id, for deletion and cleanup tracking.
    pub message_id: i32,
    /// Text content, if any.
    pub text: Option<String>,
    /// File ids of attached media, largest photo size only.
    pub media: Vec<String>,
    /// Reply context, when the message replies to another.
    pub reply: Option<ReplyInfo>,
}

/// An inline-button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    /// Callback query id, answered to stop the client spinner.
    pub callback_id: String,
    /// Chat the pressed button's message lives in.
    pub chat: ChatContext,
    /// User who pressed the button.
    pub actor: Actor,
    /// The message carrying the buttons, for in-place edits.
    pub origin: MessageRef,
    /// Raw delimited payload.
    pub data: String,
}

/// Either inbound event shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A text or media message.
    Message(MessageEvent),
    /// An inline-button press.
    Callback(CallbackEvent),
}

impl ChatEvent {
    /// Originating chat.
    #[must_use]
    pub fn chat(&self) -> &ChatContext {
        match self {
            Self::Message(m) => &m.chat,
            Self::Callback(c) => &c.chat,
        }
    }

    /// Acting user.
    #[must_use]
    pub fn actor(&self) -> &Actor {
        match self {
            Self::Message(m) => &m.actor,
            Self::Callback(c) => &c.actor,
        }
    }

    /// Conversation-store key for this event.
    #[must_use]
    pub fn conv_key(&self) -> ConvKey {
        ConvKey {
            chat_id: self.chat().chat_id,
            user_id: self.actor().telegram_id,
        }
    }
}

/// Collect media file ids from a message, one per media kind (largest
/// photo size only).
#[must_use]
pub fn collect_media(msg: &Message) -> Vec<String> {
    let mut refs = Vec::new();
    if let Some(photos) = msg.photo() {
        if let Some(largest) = photos.last() {
            refs.push(largest.file.id.clone());
        }
    }
    if let Some(video) = msg.video() {
        refs.push(video.file.id.clone());
    }
    if let Some(audio) = msg.audio() {
        refs.push(audio.file.id.clone());
    }
    if let Some(voice) = msg.voice() {
        refs.push(voice.file.id.clone());
    }
    if let Some(document) = msg.document() {
        refs.push(document.file.id.clone());
    }
    refs
}

fn chat_context(msg: &Message) -> ChatContext {
    let kind = if msg.chat.is_private() {
        ChatKind::Private
    } else if msg.chat.is_group() {
        ChatKind::Group
    } else {
        ChatKind::Supergroup
    };
    ChatContext {
        chat_id: msg.chat.id.0,
        kind,
        thread_id: msg.thread_id.map(|t| i64::from(t.0 .0)),
        title: msg.chat.title().map(str::to_owned),
    }
}

fn actor_name(user: &teloxide::types::User) -> String {
    user.username.clone().unwrap_or_else(|| user.full_name())
}

/// Convert an inbound message; `None` when it has no human sender.
#[must_use]
pub fn message_event(msg: &Message) -> Option<MessageEvent> {
    let from = msg.from.as_ref()?;
    let reply = msg.reply_to_message().map(|replied| ReplyInfo {
        text: replied.text().map(str::to_owned),
        media: collect_media(replied),
        author_name: replied.from.as_ref().map(actor_name),
    });
    Some(MessageEvent {
        chat: chat_context(msg),
        actor: Actor {
            telegram_id: i64::try_from(from.id.0).ok()?,
            display_name: actor_name(from),
        },
        message_id: msg.id.0,
        text: msg.text().map(str::to_owned),
        media: collect_media(msg),
        reply,
    })
}

/// Convert an inbound callback query; `None` when the button's message is
/// inaccessible or the payload is missing.
#[must_use]
pub fn callback_event(query: &CallbackQuery) -> Option<CallbackEvent> {
    let data = query.data.clone()?;
    let Some(MaybeInaccessibleMessage::Regular(origin_msg)) = query.message.as_ref() else {
        return None;
    };
    Some(CallbackEvent {
        callback_id: query.id.clone(),
        chat: chat_context(origin_msg),
        actor: Actor {
            telegram_id: i64::try_from(query.from.id.0).ok()?,
            display_name: actor_name(&query.from),
        },
        origin: MessageRef {
            chat_id: origin_msg.chat.id.0,
            message_id: origin_msg.id.0,
        },
        data,
    })
}
