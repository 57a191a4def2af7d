//! Long-polling runner: classifies every teloxide update and passes it to the
//! [`HandlerChain`]. Resolves the bot identity with `get_me` before dispatching.

use std::sync::Arc;

use anyhow::Result;
use dflow_core::{classify, init_tracing, Actor, DflowError, HandlerResponse, IdentityScheme};
use handler_chain::HandlerChain;
use teloxide::prelude::*;
use tracing::{error, info, instrument, warn};

use crate::bot_adapter::TelegramBotAdapter;
use crate::components::{build_context_store, build_handler_chain, build_teloxide_bot};
use crate::config::TelegramConfig;

/// Classifies one update and runs the chain for it.
pub async fn process_update(
    chain: &HandlerChain,
    update: Update,
    scheme: IdentityScheme,
) -> dflow_core::Result<HandlerResponse> {
    let classified = classify(update, scheme)?;
    info!(
        user_id = %classified.user_id,
        category = %classified.category,
        update_id = classified.update.id.0,
        "step: processing update (handler chain started)"
    );
    chain.handle(&classified).await
}

/// Starts long polling with the given teloxide Bot and chain. Returns on Ctrl-C.
#[instrument(skip(bot, handler_chain))]
pub async fn run_polling(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    scheme: IdentityScheme,
) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => info!(
            username = ?me.user.username,
            bot_id = me.user.id.0,
            "Bot identity resolved before polling"
        ),
        Err(e) => warn!(error = %e, "get_me failed, polling anyway"),
    }

    let handler = dptree::entry().endpoint(
        |update: Update, chain: HandlerChain, scheme: IdentityScheme| async move {
            let update_id = update.id.0;
            if let Err(e) = process_update(&chain, update, scheme).await {
                if e.is_validation() || matches!(e, DflowError::MalformedUpdate(_)) {
                    warn!(error = %e, update_id = update_id, "Update skipped");
                } else {
                    error!(error = %e, update_id = update_id, "Handler chain failed");
                }
            }
            respond(())
        },
    );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_chain, scheme])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Polling stopped");
    Ok(())
}

/// Main entry: validate config, init logging, build components, then poll.
#[instrument(skip(config, actor))]
pub async fn run_dialog_bot(config: TelegramConfig, actor: Arc<dyn Actor>) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file.as_deref())?;

    info!(
        identity_scheme = ?config.identity_scheme,
        empty_text = ?config.empty_text,
        history_limit = ?config.history_limit,
        "Initializing bot"
    );

    let teloxide_bot = build_teloxide_bot(&config);
    let store = build_context_store(&config).await?;
    let bot = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let chain = build_handler_chain(&config, store, actor, bot);

    info!("Bot started successfully");
    run_polling(teloxide_bot, chain, config.identity_scheme).await
}
