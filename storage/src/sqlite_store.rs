//! SQLite-backed context store: one row per identity, context serialized as JSON.
//!
//! The transient current update is not serialized, so a loaded context never carries
//! the update of an earlier turn.

use async_trait::async_trait;
use chrono::Utc;
use dflow_core::{Context, ContextStore, Result};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SqliteContextStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteContextStore {
    pub async fn new(database_url: &str) -> std::result::Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> std::result::Result<(), StorageError> {
        info!("Creating contexts table if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contexts (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }

    async fn load(&self, id: &str) -> std::result::Result<Option<Context>, StorageError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM contexts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;

        row.map(|(data,)| {
            serde_json::from_str(&data).map_err(|source| StorageError::Corrupt {
                id: id.to_string(),
                source,
            })
        })
        .transpose()
    }

    async fn save(&self, id: &str, context: &Context) -> std::result::Result<(), StorageError> {
        let data = serde_json::to_string(context)?;

        sqlx::query(
            r#"
            INSERT INTO contexts (id, data, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(&data)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        debug!(context_id = %id, bytes = data.len(), "Saved context");
        Ok(())
    }

    async fn delete(&self, id: &str) -> std::result::Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM contexts WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ContextStore for SqliteContextStore {
    async fn get(&self, id: &str) -> Result<Option<Context>> {
        Ok(self.load(id).await?)
    }

    async fn put(&self, id: &str, context: &Context) -> Result<()> {
        Ok(self.save(id, context).await?)
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.delete(id).await?)
    }
}
