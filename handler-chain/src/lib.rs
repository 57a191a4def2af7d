//! # Handler chain
//!
//! Runs one turn per classified update: the context lifecycle loads the identity's context,
//! middleware `before` run in order (and can stop the chain), the first handler that returns
//! Stop or Reply ends handler execution, middleware `after` run in reverse order, and the
//! lifecycle persists the context whatever the outcome.
//!
//! Turns of the same identity never overlap; turns of different identities run concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use dflow_core::{
    ClassifiedUpdate, Context, ContextLifecycle, Handler, HandlerResponse, Middleware, Result,
};
use tracing::{debug, error, info, instrument};

type TurnLocks = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

/// One identity's claim on its turn lock. Dropping it (after the turn, or when the `handle`
/// future is dropped mid-wait or mid-turn) releases the lock and removes the map entry once
/// no other turn holds or awaits it.
struct TurnSlot {
    locks: TurnLocks,
    user_id: String,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl TurnSlot {
    fn acquire(locks: &TurnLocks, user_id: &str) -> Self {
        let lock = locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.to_string())
            .or_default()
            .clone();
        Self {
            locks: locks.clone(),
            user_id: user_id.to_string(),
            lock,
            guard: None,
        }
    }

    async fn lock(&mut self) {
        self.guard = Some(self.lock.clone().lock_owned().await);
    }
}

impl Drop for TurnSlot {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // The map and this slot hold the only references.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.user_id);
        }
    }
}

/// Chain of middleware and handlers around an optional context lifecycle.
#[derive(Clone, Default)]
pub struct HandlerChain {
    lifecycle: Option<Arc<dyn ContextLifecycle>>,
    middleware: Vec<Arc<dyn Middleware>>,
    handlers: Vec<Arc<dyn Handler>>,
    turn_locks: TurnLocks,
}

impl HandlerChain {
    /// Creates an empty chain (no lifecycle, no middleware, no handlers).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the context lifecycle. Without one, each turn gets a fresh unsaved context.
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn ContextLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Appends a middleware (runs before handlers, after in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a handler (runs in order; first Stop/Reply ends handler phase).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Number of identities with a turn in flight or waiting.
    pub fn active_identities(&self) -> usize {
        self.turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Runs one turn for `update`, serialized with other turns of the same identity.
    ///
    /// Returns the first Stop or Reply, or Continue. A turn error is handed to the
    /// lifecycle's post phase and then returned; a post-phase error takes precedence.
    #[instrument(skip(self, update), fields(user_id = %update.user_id))]
    pub async fn handle(&self, update: &ClassifiedUpdate) -> Result<HandlerResponse> {
        let mut turn = TurnSlot::acquire(&self.turn_locks, &update.user_id);
        turn.lock().await;
        self.handle_locked(update).await
    }

    async fn handle_locked(&self, update: &ClassifiedUpdate) -> Result<HandlerResponse> {
        info!(
            user_id = %update.user_id,
            chat_id = ?update.chat_id.map(|c| c.0),
            category = %update.category,
            update_id = update.update.id.0,
            "step: handler_chain started"
        );

        let Some(lifecycle) = &self.lifecycle else {
            let mut context = Context::new(update.user_id.clone());
            context.set_current_update(update.update.clone());
            return self.run_turn(update, &mut context).await;
        };

        let mut context = lifecycle.pre_process(update).await?;
        let result = self.run_turn(update, &mut context).await;
        if let Err(e) = &result {
            error!(error = %e, user_id = %update.user_id, "step: turn failed");
        }

        lifecycle
            .post_process(update, context, result.as_ref().err())
            .await?;

        info!(user_id = %update.user_id, "step: handler_chain finished");
        result
    }

    async fn run_turn(
        &self,
        update: &ClassifiedUpdate,
        context: &mut Context,
    ) -> Result<HandlerResponse> {
        let mut final_response = HandlerResponse::Continue;

        // Run all middleware before; if any returns false, stop and return Stop.
        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            info!(
                user_id = %update.user_id,
                middleware = %mw_name,
                "step: middleware before"
            );
            if !mw.before(update, context).await? {
                info!(
                    user_id = %update.user_id,
                    middleware = %mw_name,
                    "step: middleware before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
        }

        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            info!(
                user_id = %update.user_id,
                handler = %handler_name,
                "step: handler processing"
            );
            let response = handler.handle(update, context).await?;
            debug!(handler = %handler_name, response = ?response, "Handler processed");

            match response {
                HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                    info!(
                        user_id = %update.user_id,
                        handler = %handler_name,
                        "step: handler chain stopped by handler"
                    );
                    final_response = response;
                    break;
                }
                HandlerResponse::Continue | HandlerResponse::Ignore => continue,
            }
        }

        // Run middleware after in reverse order (last added runs first here).
        for mw in self.middleware.iter().rev() {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            info!(
                user_id = %update.user_id,
                middleware = %mw_name,
                "step: middleware after"
            );
            mw.after(update, context, &final_response).await?;
        }

        Ok(final_response)
    }
}

// Unit/integration tests live in tests/handler_chain_test.rs
