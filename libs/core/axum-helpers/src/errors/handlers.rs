use super::{AppError, ErrorCode};

/// Fallback handler for unmatched routes.
pub async fn not_found() -> AppError {
    AppError::NotFound(ErrorCode::NotFound.default_message().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[tokio::test]
    async fn test_not_found_fallback_is_app_error() {
        let err = not_found().await;
        assert!(matches!(&err, AppError::NotFound(msg) if msg == "Resource not found"));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
