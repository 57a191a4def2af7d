//! Context lifecycle: load or create the identity's context before the turn, persist it
//! after the turn whatever happened in between.

use std::sync::Arc;

use async_trait::async_trait;
use dflow_core::{ClassifiedUpdate, Context, ContextLifecycle, ContextStore, DflowError, Result};
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct ContextMiddleware {
    store: Arc<dyn ContextStore>,
}

impl ContextMiddleware {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ContextStore> {
        &self.store
    }
}

#[async_trait]
impl ContextLifecycle for ContextMiddleware {
    #[instrument(skip(self, update), fields(user_id = %update.user_id, category = %update.category))]
    async fn pre_process(&self, update: &ClassifiedUpdate) -> Result<Context> {
        let mut context = match self.store.get(&update.user_id).await? {
            Some(context) => context,
            None => {
                info!(user_id = %update.user_id, "step: ContextMiddleware new context");
                Context::new(update.user_id.clone())
            }
        };

        context.set_current_update(update.update.clone());
        let index = context.add_request(update.text.clone());

        info!(
            user_id = %update.user_id,
            request_index = index,
            "step: ContextMiddleware pre_process done"
        );
        Ok(context)
    }

    #[instrument(skip(self, update, context, turn_error), fields(user_id = %update.user_id))]
    async fn post_process(
        &self,
        update: &ClassifiedUpdate,
        context: Context,
        turn_error: Option<&DflowError>,
    ) -> Result<()> {
        if let Some(e) = turn_error {
            error!(
                error = %e,
                user_id = %update.user_id,
                category = %update.category,
                "Turn failed, persisting context anyway"
            );
        }

        self.store.put(&update.user_id, &context).await.map_err(|e| {
            error!(error = %e, user_id = %update.user_id, "Failed to persist context");
            e
        })?;

        info!(user_id = %update.user_id, "step: ContextMiddleware post_process done");
        Ok(())
    }
}
