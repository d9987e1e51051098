//! Key-value store abstraction layer.
//!
//! Provides a trait-based store abstraction with implementations for:
//! - In-memory ordered storage (development, tests)
//! - SQLite-backed storage (production)

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KvPair, KvStore};

use std::path::PathBuf;
use std::sync::Arc;

/// Store backend configuration.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// In-memory storage, lost on restart.
    Memory,
    /// SQLite database at the given path.
    Sqlite(PathBuf),
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory
    }
}

/// Create a store based on configuration.
pub async fn create_store(config: StoreConfig) -> StoreResult<Arc<dyn KvStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::Sqlite(path) => Ok(Arc::new(SqliteStore::new(&path).await?)),
    }
}
