//! User directory implementations.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{KvStore, StoreResult};

const USER_PREFIX: &[u8] = b"__users__";

/// Existence check against the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether the named user exists.
    async fn user_exists(&self, user_name: &str) -> StoreResult<bool>;
}

/// User directory backed by the metadata store.
///
/// One marker record per user under a fixed prefix, written by the account
/// management tooling.
pub struct KvUserDirectory {
    store: Arc<dyn KvStore>,
}

impl KvUserDirectory {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn user_key(user_name: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(USER_PREFIX.len() + user_name.len());
        key.extend_from_slice(USER_PREFIX);
        key.extend_from_slice(user_name.as_bytes());
        key
    }

    /// Register a user. Idempotent.
    pub async fn register(&self, user_name: &str) -> StoreResult<()> {
        self.store.put(&Self::user_key(user_name), b"{}").await
    }
}

#[async_trait]
impl UserDirectory for KvUserDirectory {
    async fn user_exists(&self, user_name: &str) -> StoreResult<bool> {
        match self.store.get(&Self::user_key(user_name)).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Fixed user list declared in configuration (dev mode, tests).
#[derive(Debug, Default)]
pub struct StaticUserDirectory {
    users: HashSet<String>,
}

impl StaticUserDirectory {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn user_exists(&self, user_name: &str) -> StoreResult<bool> {
        Ok(self.users.contains(user_name))
    }
}
