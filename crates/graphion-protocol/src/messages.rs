//! Request and response shapes for the session operations.
//!
//! These are the logical message bodies; the HTTP layer maps them 1:1 onto
//! JSON without adding fields of its own.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::session::{ExecutionPlanId, QueryDesc, Session, SessionId};

/// Request to open a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// User opening the session; must exist in the user directory.
    pub user: String,
    /// Address of the front-end the client connected to.
    pub graph_addr: String,
    /// Address the client connected from.
    pub client_ip: String,
}

/// Response carrying a single session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: Session,
}

/// Heartbeat: a front-end reports the sessions it currently owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSessionsRequest {
    /// Client-observed session snapshots, reconciled independently.
    pub sessions: Vec<Session>,
}

/// Result of reconciling one heartbeat batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionsResponse {
    /// Per-session queries the server marked for killing since the client's
    /// last snapshot, keyed by session id then execution plan id.
    #[serde(default)]
    pub killed_queries: HashMap<SessionId, HashMap<ExecutionPlanId, QueryDesc>>,
    /// Sessions no longer present server-side; the front-end should drop
    /// them.
    #[serde(default)]
    pub killed_sessions: Vec<SessionId>,
}

/// Response listing every session in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<Session>,
}

/// Request to remove a batch of sessions, best-effort per id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSessionsRequest {
    pub session_ids: Vec<SessionId>,
}

/// The subset of requested sessions that were actually removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveSessionsResponse {
    pub removed_session_ids: Vec<SessionId>,
}

/// Request to mark specific queries for killing, fail-fast.
///
/// Ordered maps keep the fail-fast iteration order deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillQueriesRequest {
    /// Execution plans to kill, keyed by owning session.
    pub kill_queries: BTreeMap<SessionId, BTreeSet<ExecutionPlanId>>,
}
