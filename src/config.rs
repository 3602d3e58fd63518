//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Nested Telegram connectivity configuration.
///
/// The bot token is loaded at runtime via OS keychain or environment
/// variable, never from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TelegramConfig {
    /// Bot username, used when rendering help text.
    #[serde(default = "default_bot_username")]
    pub bot_username: String,
    /// Bot API token (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

fn default_bot_username() -> String {
    "teledo_bot".into()
}

/// Bootstrap admin identity promoted on startup.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BootstrapAdmin {
    /// Telegram user id of the initial admin, if known.
    #[serde(default)]
    pub telegram_id: Option<i64>,
    /// Display name of the initial admin, if known.
    #[serde(default)]
    pub username: Option<String>,
}

impl BootstrapAdmin {
    /// Whether any identity is configured at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.telegram_id.is_none() && self.username.is_none()
    }
}

/// Lifetime settings for ephemeral in-memory state.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TtlConfig {
    /// Seconds before a stalled conversation flow is swept.
    #[serde(default = "default_conversation_seconds")]
    pub conversation_seconds: u64,
    /// Seconds before staged media references are swept.
    #[serde(default = "default_media_seconds")]
    pub media_seconds: u64,
    /// Delay before transient confirmation/error messages are deleted.
    #[serde(default = "default_cleanup_delay_seconds")]
    pub cleanup_delay_seconds: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            conversation_seconds: default_conversation_seconds(),
            media_seconds: default_media_seconds(),
            cleanup_delay_seconds: default_cleanup_delay_seconds(),
        }
    }
}

fn default_conversation_seconds() -> u64 {
    1800
}

fn default_media_seconds() -> u64 {
    600
}

fn default_cleanup_delay_seconds() -> u64 {
    3
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path to the `SQLite` database file.
    pub database_path: PathBuf,
    /// Telegram connectivity settings.
    #[serde(default = "default_telegram")]
    pub telegram: TelegramConfig,
    /// Bootstrap admin promoted on startup.
    #[serde(default)]
    pub bootstrap_admin: BootstrapAdmin,
    /// Ephemeral-state lifetimes.
    #[serde(default)]
    pub ttl: TtlConfig,
}

fn default_telegram() -> TelegramConfig {
    TelegramConfig {
        bot_username: default_bot_username(),
        bot_token: String::new(),
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the bot token from OS keychain with env-var fallback.
    ///
    /// Tries the `teledo` keyring service first, then falls back to the
    /// `TELEGRAM_BOT_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor env var provides
    /// the token.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.telegram.bot_token = load_credential("bot_token", "TELEGRAM_BOT_TOKEN").await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(AppError::Config("database_path must not be empty".into()));
        }
        if self.ttl.conversation_seconds == 0 {
            return Err(AppError::Config(
                "ttl.conversation_seconds must be greater than zero".into(),
            ));
        }
        if self.ttl.media_seconds == 0 {
            return Err(AppError::Config(
                "ttl.media_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // Keyring is synchronous I/O, so it runs on the blocking pool.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new("teledo", &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
