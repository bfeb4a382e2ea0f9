use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;

use super::AppState;
use super::schemas::ErrorResponse;

/// Stored images never change under a key without the caller adding a
/// cache-busting query parameter.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// `GET /api/image/{*key}` -- serve stored image bytes.
#[utoipa::path(
    get,
    path = "/api/image/{key}",
    tag = "Image",
    summary = "Retrieve image",
    description = "Returns the stored bytes with a long-lived immutable cache directive.",
    params(
        ("key" = String, Path, description = "Storage key, e.g. portraits/0xabc.webp")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/webp"),
        (status = 400, description = "Malformed key", body = ErrorResponse),
        (status = 404, description = "No object under this key", body = ErrorResponse),
        (status = 500, description = "Blob store failure", body = ErrorResponse)
    )
)]
pub async fn get_image(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Response, ServerError> {
    let Path(key) = key.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "rejected image path");
        ServerError::Validation("Invalid image path".into())
    })?;
    let object = state.service.retrieve_image(&key).await?;

    let content_type = object
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL),
            ),
        ],
        Body::from(object.data),
    )
        .into_response())
}
