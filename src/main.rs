#![forbid(unsafe_code)]

//! `teledo` — Telegram task management bot binary.
//!
//! Bootstraps configuration, the `SQLite` store, the bootstrap admin, the
//! ephemeral-state sweepers, and the long-polling dispatcher.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use teledo::app::AppState;
use teledo::config::GlobalConfig;
use teledo::dispatch;
use teledo::persistence::db;
use teledo::persistence::user_repo::UserRepo;
use teledo::telegram::{event, TelegramService};
use teledo::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "teledo", about = "Telegram task management bot", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format);
    info!("teledo bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration and the bot token ─────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database ──────────────────────────────
    let db = db::connect(&config.database_path).await?;
    info!("database connected");

    ensure_bootstrap_admin(&config, &db).await;

    // ── Telegram service and shared state ────────────────
    let bot = Bot::new(config.telegram.bot_token.clone());
    let (service, _notify_worker) = TelegramService::start(bot.clone());
    let state = Arc::new(AppState::new(
        Arc::clone(&config),
        db,
        Some(Arc::new(service)),
    ));

    // ── Ephemeral-state sweepers ─────────────────────────
    let ct = CancellationToken::new();
    let _conversation_sweeper = state.conversations.spawn_sweeper(ct.clone());
    let _media_sweeper = state.media.spawn_sweeper(ct.clone());

    // ── Long-polling dispatcher ──────────────────────────
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(
            |msg: Message, state: Arc<AppState>| async move {
                if let Some(event) = event::message_event(&msg) {
                    dispatch::handle_message(event, state).await;
                }
                respond(())
            },
        ))
        .branch(Update::filter_callback_query().endpoint(
            |query: CallbackQuery, state: Arc<AppState>| async move {
                if let Some(event) = event::callback_event(&query) {
                    dispatch::handle_callback(event, state).await;
                }
                respond(())
            },
        ));

    info!("starting long polling");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![Arc::clone(&state)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    ct.cancel();
    info!("teledo stopped");
    Ok(())
}

/// Create or promote the bootstrap admin named in the configuration.
///
/// Failures are logged, never fatal — the bot can still run and an admin
/// can be promoted later.
async fn ensure_bootstrap_admin(config: &GlobalConfig, db: &db::Database) {
    let bootstrap = &config.bootstrap_admin;
    if bootstrap.is_empty() {
        return;
    }
    let username = bootstrap.username.clone().unwrap_or_else(|| {
        format!("admin_{}", bootstrap.telegram_id.unwrap_or_default())
    });
    let repo = UserRepo::new(db.clone());
    match repo.get_or_create(&username, bootstrap.telegram_id, true).await {
        Ok(user) => info!(username = %user.username, "bootstrap admin ensured"),
        Err(err) => error!(%err, "failed to bootstrap initial admin"),
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => fmt().with_env_filter(filter).init(),
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
    }
}
