use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portrait_service::PortraitError;
use thiserror::Error;

use crate::api::schemas::ErrorResponse;

/// Errors that can occur when running the portrait server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request was missing a field or carried a malformed value.
    #[error("{0}")]
    Validation(String),

    /// The requested record or object does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request body exceeded the configured limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// A collaborator failed. Carries only the generic client-facing message.
    #[error("{0}")]
    Upstream(String),
}

impl From<PortraitError> for ServerError {
    fn from(err: PortraitError) -> Self {
        match err {
            PortraitError::Validation(msg) => Self::Validation(msg),
            PortraitError::NotFound(msg) => Self::NotFound(msg),
            PortraitError::Upstream { message, source } => {
                tracing::error!(error = %source, "{message}");
                Self::Upstream(message.to_owned())
            }
        }
    }
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Config(_) | Self::Io(_) | Self::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Config(_) | Self::Io(_) => {
                tracing::error!(error = %self, "internal error");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, axum::Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use portrait_blob::BlobError;

    use super::*;

    async fn body_json(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_is_400_with_uniform_body() {
        let (status, json) = body_json(ServerError::Validation("Prompt is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({"error": "Prompt is required", "success": false})
        );
    }

    #[tokio::test]
    async fn upstream_detail_is_not_echoed() {
        let err: ServerError = PortraitError::Upstream {
            message: "Failed to save portrait",
            source: BlobError::Credentials("InvalidAccessKeyId AKIA123".into()).into(),
        }
        .into();
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to save portrait");
        assert!(!json.to_string().contains("AKIA123"));
    }

    #[tokio::test]
    async fn config_error_is_masked() {
        let (status, json) = body_json(ServerError::Config("secret path".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn statuses() {
        assert_eq!(
            ServerError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
