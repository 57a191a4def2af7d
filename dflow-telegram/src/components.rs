//! Component factory: builds the teloxide bot, the context store and the handler chain
//! from config. Isolates assembly logic from the runner.

use std::sync::Arc;

use anyhow::Result;
use dflow_core::{Actor, Bot as CoreBot, ContextStore};
use handler_chain::HandlerChain;
use handlers::DialogHandler;
use middleware::{ContextMiddleware, LoggingMiddleware};
use storage::{InMemoryContextStore, SqliteContextStore};
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use crate::config::TelegramConfig;

/// Creates the teloxide Bot, pointing it at the custom API URL when one is configured.
pub fn build_teloxide_bot(config: &TelegramConfig) -> Bot {
    let bot = Bot::new(config.bot_token.clone());
    match config.telegram_api_url.as_deref() {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

/// SQLite store when DATABASE_URL is set, in-memory store otherwise.
#[instrument(skip(config))]
pub async fn build_context_store(config: &TelegramConfig) -> Result<Arc<dyn ContextStore>> {
    match config.database_url.as_deref() {
        Some(database_url) => {
            info!(database_url = %database_url, "Using SQLite context store");
            let store = SqliteContextStore::new(database_url).await.map_err(|e| {
                error!(error = %e, database_url = %database_url, "Failed to initialize context storage");
                anyhow::anyhow!("Failed to initialize context storage: {}", e)
            })?;
            Ok(Arc::new(store))
        }
        None => {
            info!("Using in-memory context store");
            Ok(Arc::new(InMemoryContextStore::new()))
        }
    }
}

/// Wires context lifecycle, logging middleware and the dialog handler around `actor`.
pub fn build_handler_chain(
    config: &TelegramConfig,
    store: Arc<dyn ContextStore>,
    actor: Arc<dyn Actor>,
    bot: Arc<dyn CoreBot>,
) -> HandlerChain {
    let dialog = DialogHandler::new(actor, bot)
        .with_options(config.adapter_options())
        .with_history_limit(config.history_limit);

    HandlerChain::new()
        .with_lifecycle(Arc::new(ContextMiddleware::new(store)))
        .add_middleware(Arc::new(LoggingMiddleware))
        .add_handler(Arc::new(dialog))
}
