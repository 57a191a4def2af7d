//! Bot abstraction executing send operations.
//!
//! [`Bot`] is transport-agnostic; dflow-telegram implements it over teloxide and tests
//! substitute recording mocks.

use async_trait::async_trait;
use teloxide::types::ChatId;
use tracing::{debug, info};

use crate::adapter::{adapt, AdapterOptions, SendOperation};
use crate::error::Result;
use crate::response::ResponsePayload;

#[async_trait]
pub trait Bot: Send + Sync {
    /// Executes one send operation against the messaging platform.
    async fn execute(&self, operation: &SendOperation) -> Result<()>;

    /// Adapts `response` and executes the resulting operations in order. Stops at the
    /// first failed operation; nothing is sent when adaptation fails.
    async fn send_response(
        &self,
        chat_id: ChatId,
        response: ResponsePayload,
        options: &AdapterOptions,
    ) -> Result<usize> {
        let operations = adapt(response, chat_id, options)?;
        for operation in &operations {
            debug!(
                chat_id = chat_id.0,
                operation = operation.name(),
                "step: executing send operation"
            );
            self.execute(operation).await?;
        }
        info!(
            chat_id = chat_id.0,
            operations = operations.len(),
            "step: response sent"
        );
        Ok(operations.len())
    }
}
