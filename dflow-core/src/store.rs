//! Context store interface. Implementations live in the storage crate.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;

/// Key-value access to contexts, keyed by identity.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Context>>;
    async fn put(&self, id: &str, context: &Context) -> Result<()>;
    /// Returns whether a context was stored under `id`.
    async fn remove(&self, id: &str) -> Result<bool>;
}
