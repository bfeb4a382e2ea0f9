use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use portrait_blob::{BlobError, BlobLookup, BlobStore, StoredObject};
use portrait_core::StorageKey;

/// In-memory [`BlobStore`] backed by a [`DashMap`].
///
/// Intended for tests and local development. Clones share the same
/// underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<DashMap<String, StoredObject>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while set, every operation fails with
    /// [`BlobError::Connection`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether an object exists under `key`.
    pub fn contains(&self, key: &StorageKey) -> bool {
        self.objects.contains_key(key.as_str())
    }

    fn check_available(&self) -> Result<(), BlobError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BlobError::Connection("memory store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError> {
        self.check_available()?;
        debug!(key = %key, size = data.len(), "storing object in memory");
        self.objects.insert(
            key.as_str().to_owned(),
            StoredObject {
                data,
                content_type: Some(content_type.to_owned()),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<BlobLookup, BlobError> {
        self.check_available()?;
        Ok(self
            .objects
            .get(key.as_str())
            .map_or(BlobLookup::NotFound, |obj| BlobLookup::Found(obj.clone())))
    }

    async fn health_check(&self) -> Result<(), BlobError> {
        self.check_available()
    }
}
