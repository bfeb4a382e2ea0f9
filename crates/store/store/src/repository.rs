use async_trait::async_trait;
use portrait_core::{Address, PortraitRecord};

use crate::error::RepositoryError;

/// Persistence for portrait records, one row per normalized address.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait PortraitRepository: Send + Sync {
    /// Look up the record for `address`. `None` means no portrait yet.
    async fn find_by_address(
        &self,
        address: &Address,
    ) -> Result<Option<PortraitRecord>, RepositoryError>;

    /// Insert or update the record for `address` in a single atomic step.
    ///
    /// On insert both timestamps are set to now. On update `image_url` and
    /// `updated_at` change; `prompt` changes only when `Some`. `updated_at`
    /// always moves strictly forward.
    async fn upsert(
        &self,
        address: &Address,
        image_url: &str,
        prompt: Option<&str>,
    ) -> Result<PortraitRecord, RepositoryError>;

    /// Return every record, ordered by address.
    async fn list_all(&self) -> Result<Vec<PortraitRecord>, RepositoryError>;

    /// Replace only the image URL of an existing record, leaving timestamps
    /// untouched. Returns `true` if a record was updated.
    async fn set_image_url(
        &self,
        address: &Address,
        image_url: &str,
    ) -> Result<bool, RepositoryError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    /// Release backend resources such as pooled connections.
    async fn close(&self) {}
}
