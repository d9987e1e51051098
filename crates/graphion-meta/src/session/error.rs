//! Session error types.

use graphion_protocol::{ExecutionPlanId, SessionId};
use thiserror::Error;

use crate::store::StoreError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors produced by the session operations.
///
/// The store's generic key-not-found never escapes as-is: point lookups
/// translate it into `SessionNotFound`, and the batch loops treat it as a
/// normal per-item outcome.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The user does not exist in the user directory.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// No session with this id.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// The named execution plan is not running in the named session.
    #[error("query not found: session {session_id}, plan {plan_id}")]
    QueryNotFound {
        session_id: SessionId,
        plan_id: ExecutionPlanId,
    },

    /// Store failure, propagated as-is.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SessionError::QueryNotFound {
            session_id: 7,
            plan_id: 12,
        };
        assert_eq!(err.to_string(), "query not found: session 7, plan 12");
    }

    #[test]
    fn test_store_error_wraps_transparently() {
        let err: SessionError = StoreError::Backend("disk full".to_string()).into();
        assert_eq!(err.to_string(), "backend error: disk full");
    }
}
