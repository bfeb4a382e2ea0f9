//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform error body returned on every failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    #[schema(example = "Prompt is required")]
    pub error: String,
    /// Always `false`.
    pub success: bool,
}

impl ErrorResponse {
    /// Build an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}

/// Query parameters for `GET /api/portrait`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PortraitQuery {
    /// Wallet address, any case.
    pub address: Option<String>,
}

/// `GET /api/portrait` success body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortraitResponse {
    /// Reference path served by `GET /api/image/{key}`.
    #[schema(example = "/api/image/portraits/0xabc0000000000000000000000000000000000001.webp")]
    pub image_url: String,
    /// Prompt used for the committed image, if one was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Last save time; usable as a cache-busting query parameter.
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Always `true`.
    pub success: bool,
}

/// `POST /api/portrait` request body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Subject description.
    #[schema(example = "a fox wearing a scarf")]
    pub prompt: Option<String>,
    /// Style description replacing the default.
    pub system_prompt: Option<String>,
}

/// `POST /api/portrait` success body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Standard base64 encoding of the generated image bytes.
    pub image_data: String,
    /// MIME type of the decoded bytes.
    #[schema(example = "image/webp")]
    pub content_type: String,
    /// Always `true`.
    pub success: bool,
}

/// `PUT /api/portrait` request body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Wallet address, any case.
    pub address: Option<String>,
    /// Standard base64 image bytes, optionally as a `data:` URI.
    pub image_data: Option<String>,
    /// Prompt to record with the image. Blank keeps the stored prompt.
    pub prompt: Option<String>,
}

/// `PUT /api/portrait` success body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    /// Reference path of the committed image.
    pub image_url: String,
    /// Always `true`.
    pub success: bool,
}

/// `GET /health` body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    #[schema(example = "ok")]
    pub status: String,
    /// Blob store reachability.
    pub storage: String,
    /// Repository reachability.
    pub database: String,
}
