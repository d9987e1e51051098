//! API request handlers.
//!
//! Thin translations between the HTTP layer and the session service; all
//! protocol decisions live in [`crate::session::SessionService`].

use axum::{
    extract::{Path, State},
    Json,
};
use graphion_protocol::{
    CreateSessionRequest, KillQueriesRequest, ListSessionsResponse, RemoveSessionsRequest,
    RemoveSessionsResponse, SessionId, SessionResponse, UpdateSessionsRequest,
    UpdateSessionsResponse,
};
use serde::Serialize;

use super::error::ApiResult;
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "graphion-metad".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Open a new session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.sessions.create_session(request).await?;
    Ok(Json(SessionResponse { session }))
}

/// Reconcile a batch of heartbeat snapshots.
pub async fn update_sessions(
    State(state): State<AppState>,
    Json(request): Json<UpdateSessionsRequest>,
) -> ApiResult<Json<UpdateSessionsResponse>> {
    let response = state.sessions.update_sessions(request.sessions).await?;
    Ok(Json(response))
}

/// List every session in the table.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> ApiResult<Json<ListSessionsResponse>> {
    let sessions = state.sessions.list_sessions().await?;
    Ok(Json(ListSessionsResponse { sessions }))
}

/// Get a single session by id.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.sessions.get_session(session_id).await?;
    Ok(Json(SessionResponse { session }))
}

/// Remove a batch of sessions, best-effort per id.
pub async fn remove_sessions(
    State(state): State<AppState>,
    Json(request): Json<RemoveSessionsRequest>,
) -> ApiResult<Json<RemoveSessionsResponse>> {
    let removed_session_ids = state.sessions.remove_sessions(request.session_ids).await?;
    Ok(Json(RemoveSessionsResponse { removed_session_ids }))
}

/// Mark the named queries for killing, fail-fast.
pub async fn kill_queries(
    State(state): State<AppState>,
    Json(request): Json<KillQueriesRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.sessions.kill_queries(request.kill_queries).await?;
    Ok(Json(serde_json::json!({})))
}
