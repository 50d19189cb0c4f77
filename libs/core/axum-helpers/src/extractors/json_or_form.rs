use axum::{
    Form, Json,
    body::Bytes,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Body extractor accepting either JSON or URL-encoded form payloads.
///
/// The `Content-Type` header picks the decoder:
/// - `application/json` (or any `+json` suffix) is parsed as JSON
/// - `application/x-www-form-urlencoded` is parsed as a form
/// - anything else, including a missing header, yields `T::default()`
///
/// An empty JSON body also yields `T::default()`. Malformed payloads are
/// rejected with a 400 [`AppError`].
///
/// # Example
///
/// ```ignore
/// use axum_helpers::JsonOrForm;
///
/// async fn create_user(JsonOrForm(input): JsonOrForm<UserInput>) -> impl IntoResponse {
///     // input was sent as JSON or as a form
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOrForm<T>(pub T);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(req: &Request) -> BodyKind {
    let Some(content_type) = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return BodyKind::Other;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else if mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json")) {
        BodyKind::Json
    } else {
        BodyKind::Other
    }
}

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(req, state).await?;
                Ok(JsonOrForm(value))
            }
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(JsonRejection::from)?;
                if bytes.is_empty() {
                    return Ok(JsonOrForm(T::default()));
                }
                let Json(value) = Json::<T>::from_bytes(&bytes)?;
                Ok(JsonOrForm(value))
            }
            BodyKind::Other => {
                tracing::debug!("request body has no JSON or form content type, using defaults");
                Ok(JsonOrForm(T::default()))
            }
        }
    }
}
