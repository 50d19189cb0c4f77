pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Standard error envelope for transport-level failures.
///
/// ```json
/// {
///   "code": 1003,
///   "error": "JSON_EXTRACTION",
///   "message": "Failed to parse the request body as JSON: ...",
///   "details": null
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type that can be converted to HTTP responses.
///
/// Covers rejections raised before a domain handler runs: body parsing and
/// unknown routes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Form extraction error: {0}")]
    FormExtractorRejection(#[from] FormRejection),

    #[error("Not Found: {0}")]
    NotFound(String),
}

impl AppError {
    fn parts(self) -> (StatusCode, String, ErrorCode) {
        match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = ErrorCode::JsonExtraction.code(), "JSON extraction error: {:?}", e);
                (e.status(), e.body_text(), ErrorCode::JsonExtraction)
            }
            AppError::FormExtractorRejection(e) => {
                tracing::warn!(error_code = ErrorCode::FormExtraction.code(), "Form extraction error: {:?}", e);
                (e.status(), e.body_text(), ErrorCode::FormExtraction)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, msg, ErrorCode::NotFound)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error_code) = self.parts();
        let body = Json(ErrorResponse {
            code: error_code.code(),
            error: error_code.as_str().to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}
