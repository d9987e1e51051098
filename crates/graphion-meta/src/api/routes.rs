//! API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    Router::new()
        .route("/health", get(handlers::health))
        // Session lifecycle
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{session_id}", get(handlers::get_session))
        // Batch operations keep their request-body shape; none of them is
        // addressable as a single resource.
        .route("/sessions/update", post(handlers::update_sessions))
        .route("/sessions/remove", post(handlers::remove_sessions))
        .route("/queries/kill", post(handlers::kill_queries))
        .layer(trace_layer)
        .with_state(state)
}
