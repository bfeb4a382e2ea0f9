use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::HealthResponse;

fn component_status<E: std::fmt::Display>(name: &str, result: Result<(), E>) -> String {
    match result {
        Ok(()) => "ok".into(),
        Err(e) => {
            tracing::warn!(component = name, error = %e, "health check failed");
            "unavailable".into()
        }
    }
}

/// `GET /health` -- reports whether the blob store and repository respond.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Checks the blob store and the portrait repository.",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthResponse),
        (status = 503, description = "A dependency is unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, database) = tokio::join!(
        state.blobs.health_check(),
        state.repository.health_check()
    );
    let storage = component_status("storage", storage);
    let database = component_status("database", database);

    let healthy = storage == "ok" && database == "ok";
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.into(),
        storage,
        database,
    };

    (status, Json(body))
}
