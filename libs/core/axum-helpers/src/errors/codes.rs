//! Type-safe error codes for API responses.
//!
//! Each error code has:
//! - String representation for client consumption (e.g., "NOT_FOUND")
//! - Integer code for logging and monitoring (e.g., 1004)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::JsonExtraction;
//! assert_eq!(code.as_str(), "JSON_EXTRACTION");
//! assert_eq!(code.code(), 1003);
//! assert_eq!(code.default_message(), "Failed to parse request body");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource or route was not found
    NotFound,

    /// URL-encoded form extraction from request body failed
    FormExtraction,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling by clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::FormExtraction => "FORM_EXTRACTION",
        }
    }

    /// Integer code for structured logs and metrics. Client errors use 1000-1999.
    pub fn code(&self) -> i32 {
        match self {
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::FormExtraction => 1012,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::FormExtraction => "Failed to parse form body",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
