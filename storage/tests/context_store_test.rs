//! Integration tests for [`storage::InMemoryContextStore`] and [`storage::SqliteContextStore`].
//!
//! Both stores are exercised through the [`ContextStore`] trait so they share expectations.

use dflow_core::testing::text_message_update;
use dflow_core::{Context, ContextStore, DflowError, Location, NodeLabel, Response};
use storage::{InMemoryContextStore, SqliteContextStore};

fn sample_context(id: &str) -> Context {
    let mut ctx = Context::new(id);
    ctx.add_request("/start");
    ctx.add_response("Hi");
    ctx.add_label(NodeLabel::new("greeting_flow", "greeting_node"));
    ctx.misc.insert("counter".to_string(), serde_json::json!(3));
    ctx
}

async fn assert_store_roundtrip(store: &dyn ContextStore) {
    assert!(store.get("123").await.unwrap().is_none());

    let ctx = sample_context("123");
    store.put("123", &ctx).await.unwrap();

    let loaded = store.get("123").await.unwrap().expect("stored context");
    assert_eq!(loaded, ctx);
    assert!(store.get("456").await.unwrap().is_none());
}

async fn assert_store_overwrite_and_remove(store: &dyn ContextStore) {
    let mut ctx = sample_context("7");
    store.put("7", &ctx).await.unwrap();

    ctx.add_request("again");
    store.put("7", &ctx).await.unwrap();

    let loaded = store.get("7").await.unwrap().unwrap();
    assert_eq!(loaded.requests.len(), 2);
    assert_eq!(loaded.last_request(), Some("again"));

    assert!(store.remove("7").await.unwrap());
    assert!(!store.remove("7").await.unwrap());
    assert!(store.get("7").await.unwrap().is_none());
}

/// **Test: In-memory store returns what was put, per id.**
#[tokio::test]
async fn test_in_memory_roundtrip() {
    assert_store_roundtrip(&InMemoryContextStore::new()).await;
}

/// **Test: In-memory store overwrites and removes.**
#[tokio::test]
async fn test_in_memory_overwrite_and_remove() {
    assert_store_overwrite_and_remove(&InMemoryContextStore::new()).await;
}

/// **Test: SQLite store returns what was put, per id.**
///
/// **Setup:** `sqlite::memory:` database.
#[tokio::test]
async fn test_sqlite_roundtrip() {
    let store = SqliteContextStore::new("sqlite::memory:")
        .await
        .expect("Failed to create store");
    assert_store_roundtrip(&store).await;
}

/// **Test: SQLite store upserts and removes.**
#[tokio::test]
async fn test_sqlite_overwrite_and_remove() {
    let store = SqliteContextStore::new("sqlite::memory:")
        .await
        .expect("Failed to create store");
    assert_store_overwrite_and_remove(&store).await;
}

/// **Test: Contexts survive reopening a file database; the current update does not.**
///
/// **Setup:** Temp dir DB file; put a context carrying a current update.
/// **Action:** Drop the store, open a new one on the same file, `get`.
/// **Expected:** Histories restored; `current_update()` is `None`.
#[tokio::test]
async fn test_sqlite_file_persists_without_current_update() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contexts.db");
    let path = path.to_str().unwrap();

    {
        let store = SqliteContextStore::new(path).await.unwrap();
        let mut ctx = sample_context("99");
        ctx.set_current_update(text_message_update(1, 99, "hello"));
        store.put("99", &ctx).await.unwrap();
    }

    let store = SqliteContextStore::new(path).await.unwrap();
    let loaded = store.get("99").await.unwrap().unwrap();
    assert_eq!(loaded.requests, sample_context("99").requests);
    assert!(loaded.current_update().is_none());
}

/// **Test: A context whose response holds a non-finite location still loads.**
///
/// **Setup:** Context with a response located at (NaN, 0.0), put into each store.
/// **Action:** `get`, then resolve and validate the stored response.
/// **Expected:** `get` succeeds; the location reads back as NaN and fails validation.
#[tokio::test]
async fn test_non_finite_location_does_not_corrupt_context() {
    let sqlite = SqliteContextStore::new("sqlite::memory:")
        .await
        .expect("Failed to create store");
    let memory = InMemoryContextStore::new();
    let stores: [&dyn ContextStore; 2] = [&sqlite, &memory];

    for store in stores {
        let mut ctx = Context::new("1");
        ctx.add_request("where are you");
        ctx.add_response(Response::text("where").with_location(Location::new(f64::NAN, 0.0)));
        store.put("1", &ctx).await.unwrap();

        let loaded = store.get("1").await.unwrap().expect("stored context");
        assert_eq!(loaded.last_request(), Some("where are you"));
        let response = loaded.last_response().cloned().unwrap().resolve().unwrap();
        let location = response.location.unwrap();
        assert!(location.latitude.is_nan());
        assert!(matches!(
            response.validate(),
            Err(DflowError::InvalidLocation(_))
        ));
    }
}
