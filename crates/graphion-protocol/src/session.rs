//! Session and query data models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique identifier of one client session.
///
/// Generated from a microsecond wall-clock reading at creation time, so it
/// doubles as the session's creation timestamp.
pub type SessionId = i64;

/// Identifier of one running query (execution plan) within a session.
pub type ExecutionPlanId = i64;

/// Lifecycle status of a running query.
///
/// The metadata service only ever moves a query forward: `Running` may
/// become `Killing`, never the reverse. A query disappears from the session
/// when a later heartbeat snapshot omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Query is executing on a graph front-end.
    Running,
    /// A kill was requested; the owning front-end has yet to confirm.
    Killing,
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryStatus::Running => write!(f, "running"),
            QueryStatus::Killing => write!(f, "killing"),
        }
    }
}

impl std::str::FromStr for QueryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(QueryStatus::Running),
            "killing" => Ok(QueryStatus::Killing),
            _ => Err(format!("unknown query status: {}", s)),
        }
    }
}

/// One running query as reported by the owning front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDesc {
    /// When the query started, microseconds since the epoch.
    pub start_time: i64,
    /// Current lifecycle status.
    pub status: QueryStatus,
    /// Address of the front-end executing the query.
    pub graph_addr: String,
    /// The statement text, as submitted by the client.
    pub query: String,
}

/// Server-side record of one client connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier; also the microsecond creation timestamp.
    pub session_id: SessionId,
    /// Set once at creation, equal to the initial `session_id`.
    pub create_time: i64,
    /// Advanced by each accepted heartbeat; never moves backward once
    /// persisted.
    pub update_time: i64,
    /// Owning user.
    pub user_name: String,
    /// Address of the front-end that owns this session.
    pub graph_addr: String,
    /// Address the client connected from.
    pub client_ip: String,
    /// Running queries, keyed by execution plan id.
    #[serde(default)]
    pub queries: HashMap<ExecutionPlanId, QueryDesc>,
}

impl Session {
    /// Whether any query in this session is marked for killing.
    pub fn has_killing_queries(&self) -> bool {
        self.queries
            .values()
            .any(|q| q.status == QueryStatus::Killing)
    }
}
