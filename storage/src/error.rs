//! Storage error types.
//!
//! Used by store implementations; converted into [`DflowError::Storage`] at the
//! [`ContextStore`](dflow_core::ContextStore) boundary.

use dflow_core::DflowError;
use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Corrupt context {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<StorageError> for DflowError {
    fn from(err: StorageError) -> Self {
        DflowError::Storage(err.to_string())
    }
}
