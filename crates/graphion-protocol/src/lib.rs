//! Canonical protocol types for the Graphion metadata service.
//!
//! Everything here is plain data: the session/query records persisted by the
//! metadata service and the request/response shapes exchanged with graph
//! front-ends. Transport framing lives elsewhere.

mod messages;
mod session;

pub use messages::{
    CreateSessionRequest, KillQueriesRequest, ListSessionsResponse, RemoveSessionsRequest,
    RemoveSessionsResponse, SessionResponse, UpdateSessionsRequest, UpdateSessionsResponse,
};
pub use session::{ExecutionPlanId, QueryDesc, QueryStatus, Session, SessionId};
