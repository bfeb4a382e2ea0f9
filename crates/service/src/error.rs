use portrait_blob::BlobError;
use portrait_imagegen::GenerationError;
use portrait_store::RepositoryError;
use thiserror::Error;

/// Errors returned by [`PortraitService`](crate::PortraitService) operations.
///
/// The `Display` output of every variant is safe to show to a client;
/// upstream details are only reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum PortraitError {
    /// A required field was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The requested record or object does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A collaborator (image provider, blob store, database) failed.
    #[error("{message}")]
    Upstream {
        /// Generic, operation-level message.
        message: &'static str,
        /// The underlying failure.
        #[source]
        source: UpstreamError,
    },
}

impl PortraitError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn upstream(message: &'static str, source: impl Into<UpstreamError>) -> Self {
        Self::Upstream {
            message,
            source: source.into(),
        }
    }
}

/// The collaborator failure behind [`PortraitError::Upstream`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The blob store failed.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// The portrait repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The image provider failed or returned nothing usable.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
