//! Dialog handler: advances the dialog engine ([`Actor`]) by one turn, then sends the last
//! response of the context to the update's recipient through the [`Bot`].
//!
//! **Data flow:** `Handler::handle` → `Actor::turn` → `Context::last_response` →
//! `Bot::send_response` (adapter + send operations) → optional history compaction.

use std::sync::Arc;

use async_trait::async_trait;
use dflow_core::{
    Actor, AdapterOptions, Bot, ClassifiedUpdate, Context, DflowError, Handler, HandlerResponse,
    Result,
};
use tracing::{info, instrument};

pub struct DialogHandler {
    actor: Arc<dyn Actor>,
    bot: Arc<dyn Bot>,
    options: AdapterOptions,
    history_limit: Option<usize>,
}

impl DialogHandler {
    pub fn new(actor: Arc<dyn Actor>, bot: Arc<dyn Bot>) -> Self {
        Self {
            actor,
            bot,
            options: AdapterOptions::default(),
            history_limit: None,
        }
    }

    pub fn with_options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    /// Compacts context histories to the last `limit` turns after each reply.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }
}

#[async_trait]
impl Handler for DialogHandler {
    #[instrument(skip(self, update, context), fields(user_id = %update.user_id))]
    async fn handle(
        &self,
        update: &ClassifiedUpdate,
        context: &mut Context,
    ) -> Result<HandlerResponse> {
        self.actor.turn(context).await?;

        let response = context.last_response().cloned().ok_or_else(|| {
            DflowError::Handler(format!(
                "Dialog engine produced no response for {}",
                update.user_id
            ))
        })?;

        let recipient = update.recipient();
        let sent = self
            .bot
            .send_response(recipient, response.clone(), &self.options)
            .await?;
        info!(
            user_id = %update.user_id,
            chat_id = recipient.0,
            label = ?context.last_label(),
            operations = sent,
            "step: DialogHandler response sent"
        );

        if let Some(limit) = self.history_limit {
            context.clear(limit);
        }

        Ok(HandlerResponse::Reply(response))
    }
}
