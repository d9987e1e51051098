//! SQLite-backed store implementation.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use log::debug;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::traits::{prefix_upper_bound, KvPair};
use super::{KvStore, StoreError, StoreResult};

/// Durable store backed by a single SQLite table.
///
/// Keys are BLOBs compared with memcmp, so SQLite's native ordering matches
/// the lexicographic order the `KvStore` contract requires.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub async fn new(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(backend)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(backend)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(backend)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(backend)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("running migrations: {}", e)))?;
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM meta_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|(value,)| value)
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO meta_kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn put_batch(&self, batch: Vec<KvPair>) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(backend)?;
        for (key, value) in &batch {
            sqlx::query(
                "INSERT INTO meta_kv (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )
            .bind(key.as_slice())
            .bind(value.as_slice())
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }
        tx.commit().await.map_err(backend)?;

        debug!("committed batch of {} entries", batch.len());
        Ok(())
    }

    async fn remove(&self, key: &[u8]) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM meta_kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::key_not_found(key));
        }
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KvPair>> {
        let rows: Vec<(Vec<u8>, Vec<u8>)> = match prefix_upper_bound(prefix) {
            Some(upper) => {
                sqlx::query_as(
                    "SELECT key, value FROM meta_kv WHERE key >= ? AND key < ? ORDER BY key",
                )
                .bind(prefix)
                .bind(upper)
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?
            }
            None => sqlx::query_as("SELECT key, value FROM meta_kv WHERE key >= ? ORDER BY key")
                .bind(prefix)
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?,
        };

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.put(b"k1", b"v1").await.unwrap();
        assert_eq!(store.get(b"k1").await.unwrap(), b"v1");

        store.remove(b"k1").await.unwrap();
        assert!(store.get(b"k1").await.unwrap_err().is_not_found());
        assert!(store.remove(b"k1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_scan_prefix_ordered() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.put(b"s\x00\x03", b"c").await.unwrap();
        store.put(b"s\x00\x01", b"a").await.unwrap();
        store.put(b"s\x00\x02", b"b").await.unwrap();
        store.put(b"u\x00\x01", b"other").await.unwrap();

        let pairs = store.scan_prefix(b"s\x00").await.unwrap();
        let values: Vec<_> = pairs.iter().map(|(_, v)| v.as_slice()).collect();
        assert_eq!(values, vec![b"a".as_slice(), b"b", b"c"]);
    }

    #[tokio::test]
    async fn test_put_batch_visible_after_commit() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .put_batch(vec![
                (b"a".to_vec(), b"1".to_vec()),
                (b"b".to_vec(), b"2".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(store.get(b"a").await.unwrap(), b"1");
        assert_eq!(store.get(b"b").await.unwrap(), b"2");
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta.db");

        {
            let store = SqliteStore::new(&path).await.unwrap();
            store.put(b"k", b"v").await.unwrap();
        }

        let store = SqliteStore::new(&path).await.unwrap();
        assert_eq!(store.get(b"k").await.unwrap(), b"v");
    }
}
