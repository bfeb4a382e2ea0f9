use thiserror::Error;

/// Errors that can occur during repository operations.
///
/// A missing record is not an error; lookups return `None`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Failed to connect to the backend.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend rejected or failed a query.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored row could not be decoded into a record.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}
