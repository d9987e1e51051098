//! Unified API error handling with structured responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::session::SessionError;

/// API error type with structured responses.
///
/// Variants mirror the domain error taxonomy so clients get a
/// machine-readable code, not just an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Query not found: {0}")]
    QueryNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) | Self::QueryNotFound(_) | Self::UserNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::QueryNotFound(_) => "QUERY_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        match &self {
            ApiError::Store(msg) => {
                error!(error_code = code, message = %msg, "API error");
            }
            _ => {
                debug!(error_code = code, message = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            error: message,
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UserNotFound(user) => ApiError::UserNotFound(user),
            SessionError::SessionNotFound(id) => ApiError::SessionNotFound(id.to_string()),
            SessionError::QueryNotFound { .. } => ApiError::QueryNotFound(err.to_string()),
            SessionError::Store(store) => ApiError::Store(store.to_string()),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_session_not_found_maps_to_404() {
        let err: ApiError = SessionError::SessionNotFound(42).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "SESSION_NOT_FOUND");
    }

    #[test]
    fn test_query_not_found_maps_to_404() {
        let err: ApiError = SessionError::QueryNotFound {
            session_id: 1,
            plan_id: 2,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "QUERY_NOT_FOUND");
    }

    #[test]
    fn test_store_error_maps_to_500() {
        let err: ApiError = SessionError::Store(StoreError::Backend("boom".to_string())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "STORE_ERROR");
    }

    #[test]
    fn test_user_not_found_keeps_user_name() {
        let err: ApiError = SessionError::UserNotFound("mallory".to_string()).into();
        assert_eq!(err.to_string(), "User not found: mallory");
    }
}
