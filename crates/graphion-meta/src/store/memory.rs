//! In-memory ordered store implementation.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{prefix_upper_bound, KvPair};
use super::{KvStore, StoreError, StoreResult};

/// In-memory store backed by an ordered map.
///
/// Used for tests and `store.backend = "memory"` dev deployments; contents
/// are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn put_batch(&self, batch: Vec<KvPair>) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        for (key, value) in batch {
            entries.insert(key, value);
        }
        Ok(())
    }

    async fn remove(&self, key: &[u8]) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::key_not_found(key))
    }

    async fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<KvPair>> {
        let entries = self.entries.read().await;
        let upper = match prefix_upper_bound(prefix) {
            Some(bound) => Bound::Excluded(bound),
            None => Bound::Unbounded,
        };
        let range = (Bound::Included(prefix.to_vec()), upper);
        Ok(entries
            .range::<Vec<u8>, _>(range)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        store.put(b"k1", b"v1").await.unwrap();
        assert_eq!(store.get(b"k1").await.unwrap(), b"v1");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(b"absent").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let store = MemoryStore::new();
        store.put(b"k", b"old").await.unwrap();
        store.put(b"k", b"new").await.unwrap();
        assert_eq!(store.get(b"k").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryStore::new();
        store.put(b"k", b"v").await.unwrap();
        store.remove(b"k").await.unwrap();
        assert!(store.get(b"k").await.unwrap_err().is_not_found());
        assert!(store.remove(b"k").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_scan_prefix_ordered_and_bounded() {
        let store = MemoryStore::new();
        store.put(b"s\x00\x02", b"b").await.unwrap();
        store.put(b"s\x00\x01", b"a").await.unwrap();
        store.put(b"t\x00\x01", b"other").await.unwrap();

        let pairs = store.scan_prefix(b"s\x00").await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, b"s\x00\x01");
        assert_eq!(pairs[1].0, b"s\x00\x02");
    }

    #[tokio::test]
    async fn test_scan_prefix_with_trailing_ff() {
        let store = MemoryStore::new();
        store.put(&[0xff, 0x01], b"in").await.unwrap();
        store.put(&[0xfe, 0x01], b"out").await.unwrap();

        let pairs = store.scan_prefix(&[0xff]).await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, b"in");
    }

    #[tokio::test]
    async fn test_put_batch_empty_is_noop() {
        let store = MemoryStore::new();
        store.put_batch(Vec::new()).await.unwrap();
        assert!(store.scan_prefix(b"").await.unwrap().is_empty());
    }
}
