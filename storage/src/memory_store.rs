//! Process-local context store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dflow_core::{Context, ContextStore, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps contexts in a shared map. Cloning shares the same map.
#[derive(Clone, Default)]
pub struct InMemoryContextStore {
    contexts: Arc<RwLock<HashMap<String, Context>>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contexts.read().await.is_empty()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get(&self, id: &str) -> Result<Option<Context>> {
        Ok(self.contexts.read().await.get(id).cloned())
    }

    async fn put(&self, id: &str, context: &Context) -> Result<()> {
        debug!(context_id = %id, requests = context.requests.len(), "Storing context");
        self.contexts
            .write()
            .await
            .insert(id.to_string(), context.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.contexts.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_map() {
        let store = InMemoryContextStore::new();
        let other = store.clone();

        store.put("1", &Context::new("1")).await.unwrap();

        assert_eq!(other.len().await, 1);
        assert!(other.get("1").await.unwrap().is_some());
    }
}
