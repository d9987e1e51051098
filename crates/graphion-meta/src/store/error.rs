//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key not present in the store.
    ///
    /// Callers translate this into their own not-found codes; it is never
    /// surfaced to clients as-is.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A stored value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// Store backend error.
    #[error("backend error: {0}")]
    Backend(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Build a `KeyNotFound` with the key rendered as hex.
    pub fn key_not_found(key: &[u8]) -> Self {
        StoreError::KeyNotFound(hex::encode(key))
    }

    /// Whether this error is the generic key-not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::key_not_found(b"\x01\x02");
        assert_eq!(err.to_string(), "key not found: 0102");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_backend_not_confused_with_not_found() {
        let err = StoreError::Backend("disk full".to_string());
        assert!(!err.is_not_found());
    }
}
