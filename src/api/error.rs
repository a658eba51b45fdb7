//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::db::DbError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired token, or bad credentials
    #[error("{0}")]
    Auth(String),

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Missing resource, or one the caller does not own
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure; details are logged, not returned
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error not handled by the route
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wrap a failure as `Internal`, keeping `context` as the caller-facing message
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::error!(
            request_id = %request_id,
            error_message = %err,
            "{}",
            context
        );
        ApiError::Internal(context.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            ApiError::Internal(context) => context.clone(),
            ApiError::Database(_) | ApiError::Io(_) => {
                let request_id = uuid::Uuid::new_v4().to_string();
                tracing::error!(
                    request_id = %request_id,
                    error_message = %self,
                    "Unhandled API error"
                );
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken => ApiError::Auth(err.to_string()),
            other => ApiError::internal("Authentication failure", other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
