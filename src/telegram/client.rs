//! Telegram Bot API wrapper with a buffered notification queue.

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardMarkup, InputFile, KeyboardMarkup as ReplyKeyboardMarkup, MessageId,
    ThreadId, UserId,
};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

use crate::state::MessageRef;
use crate::{AppError, Result};

const QUEUE_CAPACITY: usize = 256;

/// A direct message queued for best-effort delivery.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Recipient Telegram user id.
    pub telegram_id: i64,
    /// Message body.
    pub text: String,
}

/// Bot API wrapper owning a buffered queue for notification fan-out.
///
/// Interactive sends go out directly; notifications go through the queue
/// so one slow or failing recipient never blocks a handler.
pub struct TelegramService {
    bot: Bot,
    queue_tx: mpsc::Sender<Notification>,
}

impl TelegramService {
    /// Wrap a bot and start the background notification sender.
    #[must_use]
    pub fn start(bot: Bot) -> (Self, JoinHandle<()>) {
        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);
        let worker = Self::spawn_worker(bot.clone(), queue_rx);
        info!("telegram service started with buffered notification queue");
        (Self { bot, queue_tx }, worker)
    }

    fn spawn_worker(bot: Bot, mut queue_rx: mpsc::Receiver<Notification>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(notification) = queue_rx.recv().await {
                let chat = ChatId(notification.telegram_id);
                // Best-effort: a blocked bot or deleted account must not
                // stop the remaining recipients.
                if let Err(error) = bot.send_message(chat, notification.text.as_str()).await {
                    warn!(?error, recipient = notification.telegram_id, "notification send failed");
                }
            }
            info!("notification sender task exiting");
        })
    }

    /// Enqueue a direct message for async best-effort delivery.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the queue is closed or full.
    pub async fn enqueue(&self, notification: Notification) -> Result<()> {
        self.queue_tx
            .send(notification)
            .await
            .map_err(|err| AppError::Telegram(format!("failed to enqueue notification: {err}")))
    }

    /// Send a plain text message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the API call fails.
    pub async fn send_text(
        &self,
        chat_id: i64,
        thread_id: Option<i64>,
        text: &str,
    ) -> Result<MessageRef> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if let Some(thread) = to_thread_id(thread_id) {
            request = request.message_thread_id(thread);
        }
        let sent = request.await?;
        Ok(MessageRef {
            chat_id,
            message_id: sent.id.0,
        })
    }

    /// Send a message carrying an inline keyboard.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the API call fails.
    pub async fn send_with_inline(
        &self,
        chat_id: i64,
        thread_id: Option<i64>,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageRef> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(keyboard);
        if let Some(thread) = to_thread_id(thread_id) {
            request = request.message_thread_id(thread);
        }
        let sent = request.await?;
        Ok(MessageRef {
            chat_id,
            message_id: sent.id.0,
        })
    }

    /// Send a message carrying a reply (menu) keyboard.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the API call fails.
    pub async fn send_with_menu(
        &self,
        chat_id: i64,
        thread_id: Option<i64>,
        text: &str,
        keyboard: ReplyKeyboardMarkup,
    ) -> Result<MessageRef> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(keyboard);
        if let Some(thread) = to_thread_id(thread_id) {
            request = request.message_thread_id(thread);
        }
        let sent = request.await?;
        Ok(MessageRef {
            chat_id,
            message_id: sent.id.0,
        })
    }

    /// Edit a previously sent message in place.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the API call fails.
    pub async fn edit_text(
        &self,
        origin: MessageRef,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let request = self
            .bot
            .edit_message_text(ChatId(origin.chat_id), MessageId(origin.message_id), text);
        match keyboard {
            Some(kb) => request.reply_markup(kb).await?,
            None => request.await?,
        };
        Ok(())
    }

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the API call fails.
    pub async fn delete(&self, target: MessageRef) -> Result<()> {
        self.bot
            .delete_message(ChatId(target.chat_id), MessageId(target.message_id))
            .await?;
        Ok(())
    }

    /// Answer a callback query, optionally with a toast text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the API call fails.
    pub async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let request = self.bot.answer_callback_query(callback_id.to_owned());
        match text {
            Some(t) => request.text(t).await?,
            None => request.await?,
        };
        Ok(())
    }

    /// Re-send a stored file attachment as a document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the API call fails.
    pub async fn send_document(&self, chat_id: i64, file_id: &str) -> Result<()> {
        self.bot
            .send_document(ChatId(chat_id), InputFile::file_id(file_id.to_owned()))
            .await?;
        Ok(())
    }

    /// Whether the user holds an administrator or owner role in the chat.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the membership query fails.
    pub async fn is_chat_admin(&self, chat_id: i64, user_id: i64) -> Result<bool> {
        let uid = u64::try_from(user_id)
            .map_err(|_| AppError::Telegram(format!("invalid user id: {user_id}")))?;
        let member = self.bot.get_chat_member(ChatId(chat_id), UserId(uid)).await?;
        Ok(member.kind.is_privileged())
    }
}

fn to_thread_id(raw: Option<i64>) -> Option<ThreadId> {
    let value = raw?;
    i32::try_from(value).ok().map(|v| ThreadId(MessageId(v)))
}
