use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use bytes::Bytes;

use crate::error::ServerError;

use super::AppState;
use super::schemas::{
    ErrorResponse, GenerateRequest, GenerateResponse, PortraitQuery, PortraitResponse,
    SaveRequest, SaveResponse,
};

/// Turn a body extraction failure into the uniform error body.
fn reject(rejection: &JsonRejection) -> ServerError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ServerError::PayloadTooLarge;
    }
    tracing::debug!(error = %rejection.body_text(), "rejected request body");
    ServerError::Validation("Invalid request body".into())
}

/// Standard alphabet, with or without trailing `=` padding.
const IMAGE_DATA: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 image data, accepting a `data:<mime>;base64,` prefix.
fn decode_image_data(raw: &str) -> Result<Bytes, ServerError> {
    let raw = raw.trim();
    let payload = match raw.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, payload)| payload),
        None => raw,
    };
    IMAGE_DATA
        .decode(payload)
        .map(Bytes::from)
        .map_err(|_| ServerError::Validation("Invalid image data".into()))
}

/// `GET /api/portrait?address=<addr>` -- fetch the committed portrait.
#[utoipa::path(
    get,
    path = "/api/portrait",
    tag = "Portrait",
    summary = "Fetch portrait",
    description = "Returns the reference path of the committed portrait for an address. The address is case-insensitive.",
    params(
        ("address" = String, Query, description = "Wallet address")
    ),
    responses(
        (status = 200, description = "Portrait exists", body = PortraitResponse),
        (status = 400, description = "Address missing or malformed", body = ErrorResponse),
        (status = 404, description = "No portrait saved for this address", body = ErrorResponse),
        (status = 500, description = "Repository failure", body = ErrorResponse)
    )
)]
pub async fn get_portrait(
    State(state): State<AppState>,
    query: Result<Query<PortraitQuery>, QueryRejection>,
) -> Result<Json<PortraitResponse>, ServerError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "rejected query string");
        ServerError::Validation("Invalid query string".into())
    })?;
    let address = query.address.as_deref().unwrap_or_default();
    let record = state
        .service
        .fetch_portrait(address)
        .await?
        .ok_or_else(|| ServerError::NotFound("No portrait found for this address".into()))?;

    Ok(Json(PortraitResponse {
        image_url: record.image_url,
        prompt: record.prompt,
        updated_at: record.updated_at,
        success: true,
    }))
}

/// `POST /api/portrait` -- generate a preview. Nothing is stored.
#[utoipa::path(
    post,
    path = "/api/portrait",
    tag = "Portrait",
    summary = "Generate preview",
    description = "Generates one image from the prompt and returns it base64-encoded. The image is not persisted; send it back with PUT to commit it.",
    request_body(content = GenerateRequest, description = "Prompt and optional style override"),
    responses(
        (status = 200, description = "Preview generated", body = GenerateResponse),
        (status = 400, description = "Prompt missing", body = ErrorResponse),
        (status = 500, description = "Image provider failure", body = ErrorResponse)
    )
)]
pub async fn generate_portrait(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ServerError> {
    let Json(request) = payload.map_err(|e| reject(&e))?;
    let prompt = request.prompt.as_deref().unwrap_or_default();

    let image = state
        .service
        .generate_portrait(prompt, request.system_prompt.as_deref())
        .await?;

    Ok(Json(GenerateResponse {
        image_data: STANDARD.encode(&image.data),
        content_type: image.format.content_type().to_owned(),
        success: true,
    }))
}

/// `PUT /api/portrait` -- commit image bytes for an address.
#[utoipa::path(
    put,
    path = "/api/portrait",
    tag = "Portrait",
    summary = "Save portrait",
    description = "Stores the image under a key derived from the address and upserts the portrait record. Saving again overwrites the previous image.",
    request_body(content = SaveRequest, description = "Address, base64 image data and optional prompt"),
    responses(
        (status = 200, description = "Portrait saved", body = SaveResponse),
        (status = 400, description = "Address or image data missing or malformed", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn save_portrait(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ServerError> {
    let Json(request) = payload.map_err(|e| reject(&e))?;
    let address = request.address.as_deref().unwrap_or_default();

    let data = match request.image_data.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() && !address.trim().is_empty() => decode_image_data(raw)?,
        _ => Bytes::new(),
    };

    let record = state
        .service
        .save_portrait(address, data, request.prompt.as_deref())
        .await?;

    Ok(Json(SaveResponse {
        image_url: record.image_url,
        success: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_base64() {
        assert_eq!(
            decode_image_data("UklGRg==").unwrap(),
            Bytes::from_static(b"RIFF")
        );
    }

    #[test]
    fn decodes_data_uri() {
        assert_eq!(
            decode_image_data("data:image/webp;base64,UklGRg==").unwrap(),
            Bytes::from_static(b"RIFF")
        );
    }

    #[test]
    fn decodes_unpadded_base64() {
        assert_eq!(
            decode_image_data("UklGRg").unwrap(),
            Bytes::from_static(b"RIFF")
        );
        assert_eq!(
            decode_image_data("data:image/webp;base64,UklGRg").unwrap(),
            Bytes::from_static(b"RIFF")
        );
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_image_data("not base64!").unwrap_err();
        assert_eq!(err.to_string(), "Invalid image data");
    }
}
