//! Telegram boundary: client wrapper, event conversion, keyboards.

pub mod client;
pub mod event;
pub mod keyboards;

pub use client::{Notification, TelegramService};
pub use event::{Actor, CallbackEvent, ChatContext, ChatEvent, ChatKind, MessageEvent, ReplyInfo};
