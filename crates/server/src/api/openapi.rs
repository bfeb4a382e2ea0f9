#![allow(clippy::needless_for_each)]

use axum::Json;
use portrait_core::PortraitRecord;
use utoipa::OpenApi;

use super::schemas::{
    ErrorResponse, GenerateRequest, GenerateResponse, HealthResponse, PortraitResponse,
    SaveRequest, SaveResponse,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Portrait API",
        version = "0.1.0",
        description = "Generate, save and serve AI portraits keyed by wallet address.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Portrait", description = "Portrait fetch, preview generation and save"),
        (name = "Image", description = "Stored image retrieval")
    ),
    paths(
        super::health::health,
        super::portrait::get_portrait,
        super::portrait::generate_portrait,
        super::portrait::save_portrait,
        super::image::get_image,
    ),
    components(schemas(
        ErrorResponse,
        GenerateRequest,
        GenerateResponse,
        HealthResponse,
        PortraitRecord,
        PortraitResponse,
        SaveRequest,
        SaveResponse,
    ))
)]
pub struct ApiDoc;

/// `GET /api-doc/openapi.json` -- the `OpenAPI` document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
