use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::validation;

/// Body sent with 409 when a create hits the unique username index
pub const DUPLICATE_USERNAME_MESSAGE: &str = "Duplicate username detected";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User validation failed: {}", validation::summary(.0))]
    Validation(ValidationErrors),

    #[error("Duplicate key error: username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Database(String),

    #[error("{0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::Validation(errors) => {
                tracing::debug!("Validation failed: {}", validation::summary(&errors));
                (StatusCode::BAD_REQUEST, Json(validation::error_body(&errors))).into_response()
            }
            UserError::DuplicateUsername(username) => {
                tracing::debug!(%username, "Duplicate username");
                (StatusCode::CONFLICT, DUPLICATE_USERNAME_MESSAGE).into_response()
            }
            UserError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            UserError::Database(msg) | UserError::Internal(msg) => {
                tracing::error!("User request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}
