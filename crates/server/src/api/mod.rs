pub mod health;
pub mod image;
pub mod openapi;
pub mod portrait;
pub mod schemas;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use portrait_blob::BlobStore;
use portrait_service::PortraitService;
use portrait_store::PortraitRepository;

use crate::error::ServerError;

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The portrait workflow.
    pub service: PortraitService,
    /// Blob store, for health checks.
    pub blobs: Arc<dyn BlobStore>,
    /// Repository, for health checks.
    pub repository: Arc<dyn PortraitRepository>,
    /// Maximum accepted request body in bytes.
    pub body_limit: usize,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Build state over the given service and the backends it was built from.
    pub fn new(
        service: PortraitService,
        blobs: Arc<dyn BlobStore>,
        repository: Arc<dyn PortraitRepository>,
    ) -> Self {
        Self {
            service,
            blobs,
            repository,
            body_limit: DEFAULT_BODY_LIMIT,
            cors_origins: Vec::new(),
        }
    }

    /// Set the request body limit.
    #[must_use]
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Restrict CORS to the given origins.
    #[must_use]
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn not_found() -> ServerError {
    ServerError::NotFound("Not found".into())
}

async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

/// Build the axum router with all API routes.
pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit;
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/api-doc/openapi.json", get(openapi::openapi_json))
        .route(
            "/api/portrait",
            get(portrait::get_portrait)
                .post(portrait::generate_portrait)
                .put(portrait::save_portrait)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/image/{*key}",
            get(image::get_image).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
