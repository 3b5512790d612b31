//! Error types for the Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Authorization failed: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Metadata provider error: {0}")]
    Provider(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Default credential failure. User-absent and wrong-password both map
    /// here so the response never reveals which one it was.
    pub fn bad_credentials() -> Self {
        AppError::Unauthorized("Incorrect username or password".to_string())
    }

    pub fn invalid_token() -> Self {
        AppError::Unauthorized("Could not validate credentials".to_string())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("You don't have enough rights".to_string())
    }

    /// Stable machine-checkable kind for the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::Duplicate(_) => "duplicate",
            AppError::Database(_) => "database",
            AppError::Provider(_) => "provider",
            AppError::Internal(_) => "internal",
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Provider(msg) => {
                tracing::error!("Metadata provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            kind: self.kind().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// True when the database rejected a statement over a unique index.
/// Repositories use this to turn constraint violations into `Duplicate`.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_one_message() {
        // Whatever actually failed, the caller sees the same detail.
        let absent = AppError::bad_credentials();
        let wrong = AppError::bad_credentials();
        assert_eq!(absent.to_string(), wrong.to_string());
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AppError::bad_credentials().kind(), "unauthorized");
        assert_eq!(AppError::forbidden().kind(), "forbidden");
        assert_eq!(AppError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(AppError::Validation("x".into()).kind(), "validation");
        assert_eq!(AppError::Duplicate("x".into()).kind(), "duplicate");
    }
}
