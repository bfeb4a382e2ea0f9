use thiserror::Error;

/// Errors that can occur during image generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request timed out.
    #[error("image generation timed out after {0}s")]
    Timeout(u64),

    /// The provider returned an error response or a failed prediction.
    #[error("image provider error: {0}")]
    Api(String),

    /// The provider response could not be parsed.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// The provider returned no usable image.
    #[error("No image generated")]
    Empty,

    /// The prediction had not finished when the wait window closed.
    #[error("prediction {0} did not complete in time")]
    Incomplete(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}
