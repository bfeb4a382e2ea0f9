use bytes::Bytes;

/// The binary content of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// The raw bytes.
    pub data: Bytes,
    /// MIME content type recorded with the object, if any.
    pub content_type: Option<String>,
}

/// Outcome of a lookup that reached the backend.
///
/// Transport and authentication failures are reported separately as
/// [`BlobError`](crate::BlobError), so callers can tell a missing object
/// from a dead dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobLookup {
    /// The object exists.
    Found(StoredObject),
    /// No object is stored under the key.
    NotFound,
}

impl BlobLookup {
    /// Convert into an `Option`, discarding the distinction.
    pub fn into_option(self) -> Option<StoredObject> {
        match self {
            Self::Found(obj) => Some(obj),
            Self::NotFound => None,
        }
    }

    /// Whether the object was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
