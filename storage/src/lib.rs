//! Storage crate: [`ContextStore`](dflow_core::ContextStore) implementations.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`memory_store`] – InMemoryContextStore (process-local map)
//! - [`sqlite_store`] – SqliteContextStore (JSON rows in SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod memory_store;
mod sqlite_pool;
mod sqlite_store;

pub use error::StorageError;
pub use memory_store::InMemoryContextStore;
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_store::SqliteContextStore;
