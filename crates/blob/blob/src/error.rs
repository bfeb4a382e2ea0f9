use thiserror::Error;

/// Errors that can occur during blob storage operations.
///
/// A missing object is not an error; see [`BlobLookup::NotFound`](crate::BlobLookup).
#[derive(Debug, Error)]
pub enum BlobError {
    /// The storage backend could not be reached.
    #[error("blob storage connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("blob storage request timed out")]
    Timeout,

    /// The request was throttled by the backend.
    #[error("blob storage request throttled")]
    Throttled,

    /// Credentials were rejected or missing.
    #[error("blob storage credential error: {0}")]
    Credentials(String),

    /// The backend returned an error.
    #[error("blob storage error: {0}")]
    Storage(String),

    /// The backend is misconfigured.
    #[error("blob storage configuration error: {0}")]
    Configuration(String),
}
