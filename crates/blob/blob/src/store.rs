use async_trait::async_trait;
use bytes::Bytes;
use portrait_core::StorageKey;

use crate::error::BlobError;
use crate::types::BlobLookup;

/// Pluggable object storage for portrait images.
///
/// Keys are opaque paths. `put` unconditionally overwrites; there is no
/// versioning, expiry or conflict detection.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any previous object.
    async fn put(&self, key: &StorageKey, data: Bytes, content_type: &str)
    -> Result<(), BlobError>;

    /// Fetch the object stored under `key`.
    async fn get(&self, key: &StorageKey) -> Result<BlobLookup, BlobError>;

    /// Prepare the backend for use (e.g. create the bucket).
    ///
    /// Called once at startup. The default does nothing.
    async fn ensure_ready(&self) -> Result<(), BlobError> {
        Ok(())
    }

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), BlobError> {
        Ok(())
    }
}
