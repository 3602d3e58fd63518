#![forbid(unsafe_code)]

//! `teledo` — Telegram task management bot.
//!
//! Admins create tasks scoped to a group or forum topic, assign users, and
//! edit metadata through inline keyboards and short slash commands; assignees
//! update status and attachments. Conversation state for multi-step flows is
//! kept in memory per (chat, user) and swept on a TTL.

pub mod app;
pub mod config;
pub mod dates;
pub mod dispatch;
pub mod errors;
pub mod handlers;
pub mod janitor;
pub mod media;
pub mod models;
pub mod notify;
pub mod permissions;
pub mod persistence;
pub mod state;
pub mod telegram;
pub mod texts;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
