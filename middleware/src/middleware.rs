use async_trait::async_trait;
use dflow_core::{ClassifiedUpdate, Context, HandlerResponse, Middleware, Result};
use tracing::{debug, info, instrument};

/// Logs each update in before() and the handler outcome in after(); always continues.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, update, _context))]
    async fn before(&self, update: &ClassifiedUpdate, _context: &mut Context) -> Result<bool> {
        info!(
            user_id = %update.user_id,
            chat_id = ?update.chat_id.map(|c| c.0),
            category = %update.category,
            text = %update.text,
            "Received update"
        );
        Ok(true)
    }

    #[instrument(skip(self, update, context, response))]
    async fn after(
        &self,
        update: &ClassifiedUpdate,
        context: &Context,
        response: &HandlerResponse,
    ) -> Result<()> {
        debug!(
            update_id = update.update.id.0,
            label = ?context.last_label(),
            response = ?response,
            "Processed update"
        );
        Ok(())
    }
}
