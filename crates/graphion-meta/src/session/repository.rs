//! Session store repository.

use std::sync::Arc;

use graphion_protocol::{Session, SessionId};

use crate::store::{KvStore, StoreError, StoreResult};

use super::keys;

/// Typed session persistence over the key-value store.
///
/// Pure translation between `Session` records and store keys/values; all
/// locking and protocol decisions live in the service above it.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KvStore>,
}

impl SessionRepository {
    /// Create a new repository.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Get a session by id. `StoreError::KeyNotFound` if absent.
    pub async fn get(&self, session_id: SessionId) -> StoreResult<Session> {
        let value = self.store.get(&keys::session_key(session_id)).await?;
        decode(&value)
    }

    /// Persist a single session.
    pub async fn put(&self, session: &Session) -> StoreResult<()> {
        let value = encode(session)?;
        self.store.put(&keys::session_key(session.session_id), &value).await
    }

    /// Persist a batch of sessions as one atomic store write.
    pub async fn put_batch(&self, sessions: &[Session]) -> StoreResult<()> {
        let mut batch = Vec::with_capacity(sessions.len());
        for session in sessions {
            batch.push((keys::session_key(session.session_id), encode(session)?));
        }
        self.store.put_batch(batch).await
    }

    /// Remove a session by id. `StoreError::KeyNotFound` if absent.
    pub async fn remove(&self, session_id: SessionId) -> StoreResult<()> {
        self.store.remove(&keys::session_key(session_id)).await
    }

    /// Enumerate every session, in store scan order.
    pub async fn list(&self) -> StoreResult<Vec<Session>> {
        let pairs = self.store.scan_prefix(keys::session_prefix()).await?;
        let mut sessions = Vec::with_capacity(pairs.len());
        for (_, value) in pairs {
            sessions.push(decode(&value)?);
        }
        Ok(sessions)
    }

    /// Raw persisted bytes for a session, for callers that need to compare
    /// stored state exactly.
    #[cfg(test)]
    pub async fn raw(&self, session_id: SessionId) -> StoreResult<Vec<u8>> {
        self.store.get(&keys::session_key(session_id)).await
    }
}

fn encode(session: &Session) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(session).map_err(|e| StoreError::Codec(e.to_string()))
}

fn decode(value: &[u8]) -> StoreResult<Session> {
    serde_json::from_slice(value).map_err(|e| StoreError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashMap;

    fn session(id: SessionId) -> Session {
        Session {
            session_id: id,
            create_time: id,
            update_time: id,
            user_name: "root".to_string(),
            graph_addr: "graphd-1:3699".to_string(),
            client_ip: "127.0.0.1".to_string(),
            queries: HashMap::new(),
        }
    }

    fn repo() -> SessionRepository {
        SessionRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let repo = repo();
        let s = session(10);
        repo.put(&s).await.unwrap();
        assert_eq!(repo.get(10).await.unwrap(), s);
    }

    #[tokio::test]
    async fn test_get_missing_is_key_not_found() {
        let repo = repo();
        assert!(repo.get(99).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_in_id_order() {
        let repo = repo();
        for id in [30, 10, 20] {
            repo.put(&session(id)).await.unwrap();
        }
        let ids: Vec<_> = repo.list().await.unwrap().iter().map(|s| s.session_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn test_remove_then_get() {
        let repo = repo();
        repo.put(&session(5)).await.unwrap();
        repo.remove(5).await.unwrap();
        assert!(repo.get(5).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_put_batch() {
        let repo = repo();
        repo.put_batch(&[session(1), session(2)]).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}
