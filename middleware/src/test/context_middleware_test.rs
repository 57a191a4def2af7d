//! Unit tests for ContextMiddleware: load-or-create, request stamping, unconditional
//! persistence.

use std::sync::Arc;

use async_trait::async_trait;
use dflow_core::testing::{callback_query_update, text_message_update};
use dflow_core::{
    classify, ClassifiedUpdate, Context, ContextLifecycle, ContextStore, DflowError,
    IdentityScheme, Result, NO_TEXT_SENTINEL,
};
use storage::InMemoryContextStore;

use crate::ContextMiddleware;

fn text_update(user_id: i64, text: &str) -> ClassifiedUpdate {
    classify(text_message_update(1, user_id, text), IdentityScheme::User).unwrap()
}

/// Store whose `put` always fails.
struct FailingPutStore;

#[async_trait]
impl ContextStore for FailingPutStore {
    async fn get(&self, _id: &str) -> Result<Option<Context>> {
        Ok(None)
    }

    async fn put(&self, _id: &str, _context: &Context) -> Result<()> {
        Err(DflowError::Storage("disk full".to_string()))
    }

    async fn remove(&self, _id: &str) -> Result<bool> {
        Ok(false)
    }
}

/// **Test: First update creates a context keyed by the user and stamps the request.**
#[tokio::test]
async fn test_pre_process_creates_context() {
    let store = Arc::new(InMemoryContextStore::new());
    let mw = ContextMiddleware::new(store.clone());
    let update = text_update(42, "/start");

    let ctx = mw.pre_process(&update).await.unwrap();

    assert_eq!(ctx.id, "42");
    assert_eq!(ctx.requests.len(), 1);
    assert_eq!(ctx.last_request(), Some("/start"));
    assert_eq!(ctx.current_update(), Some(&update.update));
    assert!(store.is_empty().await);
}

/// **Test: A full cycle grows requests by one, keeps the id and persists every time.**
///
/// **Setup:** In-memory store, three sequential turns for the same user.
/// **Expected:** After turn n, the stored context has n requests and id "42".
#[tokio::test]
async fn test_lifecycle_grows_requests_and_persists() {
    let store = Arc::new(InMemoryContextStore::new());
    let mw = ContextMiddleware::new(store.clone());

    for (n, text) in ["Hi", "how are you", "bye"].iter().enumerate() {
        let update = text_update(42, text);
        let ctx = mw.pre_process(&update).await.unwrap();
        mw.post_process(&update, ctx, None).await.unwrap();

        let stored = store.get("42").await.unwrap().unwrap();
        assert_eq!(stored.id, "42");
        assert_eq!(stored.requests.len(), n + 1);
        assert_eq!(stored.last_request(), Some(*text));
    }
}

/// **Test: Updates without text record the sentinel.**
#[tokio::test]
async fn test_pre_process_records_sentinel_for_callback() {
    let mw = ContextMiddleware::new(Arc::new(InMemoryContextStore::new()));
    let update = classify(callback_query_update(3, 42, "cute"), IdentityScheme::User).unwrap();

    let ctx = mw.pre_process(&update).await.unwrap();

    assert_eq!(ctx.last_request(), Some(NO_TEXT_SENTINEL));
}

/// **Test: The context is persisted even when the turn failed.**
#[tokio::test]
async fn test_post_process_persists_after_turn_error() {
    let store = Arc::new(InMemoryContextStore::new());
    let mw = ContextMiddleware::new(store.clone());
    let update = text_update(7, "hello");

    let ctx = mw.pre_process(&update).await.unwrap();
    let turn_error = DflowError::Handler("actor crashed".to_string());
    mw.post_process(&update, ctx, Some(&turn_error))
        .await
        .unwrap();

    assert_eq!(store.get("7").await.unwrap().unwrap().requests.len(), 1);
}

/// **Test: Persistence failure propagates.**
#[tokio::test]
async fn test_post_process_propagates_store_failure() {
    let mw = ContextMiddleware::new(Arc::new(FailingPutStore));
    let update = text_update(7, "hello");

    let ctx = mw.pre_process(&update).await.unwrap();
    let result = mw.post_process(&update, ctx, None).await;

    assert!(matches!(result, Err(DflowError::Storage(_))));
}
