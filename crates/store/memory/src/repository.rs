use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use portrait_core::{Address, PortraitRecord};
use portrait_store::{PortraitRepository, RepositoryError};

/// In-memory [`PortraitRepository`] backed by a [`DashMap`].
///
/// Upserts run under the map's per-key entry lock, so concurrent saves for the
/// same address never race into a duplicate insert.
#[derive(Debug, Clone, Default)]
pub struct MemoryPortraitRepository {
    records: Arc<DashMap<Address, PortraitRecord>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryPortraitRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while set, every operation fails with
    /// [`RepositoryError::Connection`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection(
                "memory repository marked unavailable".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PortraitRepository for MemoryPortraitRepository {
    async fn find_by_address(
        &self,
        address: &Address,
    ) -> Result<Option<PortraitRecord>, RepositoryError> {
        self.check_available()?;
        Ok(self.records.get(address).map(|r| r.clone()))
    }

    async fn upsert(
        &self,
        address: &Address,
        image_url: &str,
        prompt: Option<&str>,
    ) -> Result<PortraitRecord, RepositoryError> {
        self.check_available()?;
        let now = Utc::now();
        let prompt = prompt.map(str::to_owned);

        let record = match self.records.entry(address.clone()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.apply_save(image_url.to_owned(), prompt, now);
                record.clone()
            }
            Entry::Vacant(vacant) => vacant
                .insert(PortraitRecord::new(
                    address.clone(),
                    image_url.to_owned(),
                    prompt,
                    now,
                ))
                .clone(),
        };
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<PortraitRecord>, RepositoryError> {
        self.check_available()?;
        let mut all: Vec<PortraitRecord> = self.records.iter().map(|r| r.clone()).collect();
        all.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(all)
    }

    async fn set_image_url(
        &self,
        address: &Address,
        image_url: &str,
    ) -> Result<bool, RepositoryError> {
        self.check_available()?;
        Ok(self.records.get_mut(address).is_some_and(|mut record| {
            image_url.clone_into(&mut record.image_url);
            true
        }))
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portrait_store::testing::run_repository_conformance_tests;

    #[tokio::test]
    async fn conformance() {
        let repo = MemoryPortraitRepository::new();
        run_repository_conformance_tests(&repo).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_leave_one_record() {
        let repo = MemoryPortraitRepository::new();
        let address = Address::parse("0xRACE").unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            let address = address.clone();
            handles.push(tokio::spawn(async move {
                repo.upsert(&address, &format!("/img/{i}.webp"), None).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn unavailable_repository_errors() {
        let repo = MemoryPortraitRepository::new();
        repo.set_unavailable(true);
        let address = Address::parse("0xabc").unwrap();
        assert!(matches!(
            repo.find_by_address(&address).await,
            Err(RepositoryError::Connection(_))
        ));
        assert!(repo.upsert(&address, "/x", None).await.is_err());
    }
}
