use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error taxonomy. Identity failures are reported with opaque,
/// non-enumerating messages; infrastructure failures are logged with detail
/// and surfaced as a generic retry-later body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired reset token")]
    InvalidOrExpiredToken,
    #[error("{0}")]
    Validation(String),
    #[error("project not found")]
    ProjectNotFound,
    #[error("reset email could not be sent")]
    Notifier(#[source] anyhow::Error),
    #[error("generation request failed")]
    Generation(#[source] anyhow::Error),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::DuplicateEmail => {
                (StatusCode::CONFLICT, "Email already registered".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::InvalidOrExpiredToken => (
                StatusCode::BAD_REQUEST,
                "Invalid or expired reset token".to_string(),
            ),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::ProjectNotFound => (StatusCode::NOT_FOUND, "Project not found".to_string()),
            AppError::Notifier(e) => {
                error!(error = %e, "reset email could not be sent");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Could not send email, please try again later".to_string(),
                )
            }
            AppError::Generation(e) => {
                error!(error = %e, "generation request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Generation service unavailable, please try again later".to_string(),
                )
            }
            AppError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again later".to_string(),
                )
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again later".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
