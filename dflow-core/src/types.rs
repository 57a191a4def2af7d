//! Turn-processing traits: context lifecycle, middleware, handlers, and the dialog engine seam.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::{DflowError, Result};
use crate::response::ResponsePayload;
use crate::update::ClassifiedUpdate;

/// Handler result for the chain. `Reply` carries the response that was sent.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; nothing sent.
    Stop,
    /// Skip this handler, try next.
    Ignore,
    /// Stop the chain; the response was delivered.
    Reply(ResponsePayload),
}

/// Loads the context before a turn and persists it afterwards.
///
/// The chain always calls `post_process` once `pre_process` succeeded, including when
/// the turn failed; `error` is the failure of the turn, if any.
#[async_trait]
pub trait ContextLifecycle: Send + Sync {
    async fn pre_process(&self, update: &ClassifiedUpdate) -> Result<Context>;
    async fn post_process(
        &self,
        update: &ClassifiedUpdate,
        context: Context,
        error: Option<&DflowError>,
    ) -> Result<()>;
}

/// Middleware runs around the handlers: `before` in order, `after` in reverse.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Return false to stop the chain.
    async fn before(&self, _update: &ClassifiedUpdate, _context: &mut Context) -> Result<bool> {
        Ok(true)
    }

    async fn after(
        &self,
        _update: &ClassifiedUpdate,
        _context: &Context,
        _response: &HandlerResponse,
    ) -> Result<()> {
        Ok(())
    }
}

/// Processes a turn. The first handler returning Stop or Reply ends the handler phase.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        update: &ClassifiedUpdate,
        context: &mut Context,
    ) -> Result<HandlerResponse>;
}

/// The dialog engine: advances the context by one turn, appending a response (and usually
/// a label).
#[async_trait]
pub trait Actor: Send + Sync {
    async fn turn(&self, context: &mut Context) -> Result<()>;
}
