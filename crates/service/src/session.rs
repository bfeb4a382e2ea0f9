use portrait_core::{PortraitPhase, PortraitRecord};
use portrait_imagegen::GeneratedImage;

use crate::error::PortraitError;
use crate::service::PortraitService;

/// Client-side fetch, generate, save workflow for one address.
///
/// The preview lives here and nowhere else. A failed generate leaves the
/// phase unchanged; a failed save keeps the preview so it can be retried
/// without regenerating.
#[derive(Debug)]
pub struct PortraitSession {
    service: PortraitService,
    address: Option<String>,
    phase: PortraitPhase,
    preview: Option<GeneratedImage>,
    prompt: Option<String>,
}

impl PortraitSession {
    /// Start an empty session. Call [`load`](Self::load) before saving.
    pub fn new(service: PortraitService) -> Self {
        Self {
            service,
            address: None,
            phase: PortraitPhase::NoPortrait,
            preview: None,
            prompt: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &PortraitPhase {
        &self.phase
    }

    /// The held preview, if any.
    pub fn preview(&self) -> Option<&GeneratedImage> {
        self.preview.as_ref()
    }

    /// Fetch the committed portrait for `address` and reset the session to it.
    pub async fn load(&mut self, address: &str) -> Result<&PortraitPhase, PortraitError> {
        let record = self.service.fetch_portrait(address).await?;
        self.address = Some(address.to_owned());
        self.preview = None;
        self.prompt = None;
        self.phase = PortraitPhase::committed(record.map(|r| r.image_url));
        Ok(&self.phase)
    }

    /// Generate a new preview, replacing any preview already held.
    pub async fn generate(
        &mut self,
        prompt: &str,
        style: Option<&str>,
    ) -> Result<&GeneratedImage, PortraitError> {
        let image = self.service.generate_portrait(prompt, style).await?;
        self.phase = std::mem::replace(&mut self.phase, PortraitPhase::NoPortrait).on_generate();
        self.prompt = Some(prompt.to_owned());
        Ok(&*self.preview.insert(image))
    }

    /// Commit the held preview.
    pub async fn save(&mut self) -> Result<PortraitRecord, PortraitError> {
        let Some(address) = self.address.as_deref() else {
            return Err(PortraitError::Validation("Address is required".into()));
        };
        let Some(preview) = self.preview.as_ref() else {
            return Err(PortraitError::Validation("No preview to save".into()));
        };

        let record = self
            .service
            .save_portrait(address, preview.data.clone(), self.prompt.as_deref())
            .await?;

        self.preview = None;
        self.prompt = None;
        self.phase = std::mem::replace(&mut self.phase, PortraitPhase::NoPortrait)
            .on_save(record.image_url.clone());
        Ok(record)
    }

    /// Discard the held preview and return to the committed state.
    pub fn cancel(&mut self) -> &PortraitPhase {
        self.preview = None;
        self.prompt = None;
        self.phase = std::mem::replace(&mut self.phase, PortraitPhase::NoPortrait).on_cancel();
        &self.phase
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use portrait_blob_memory::MemoryBlobStore;
    use portrait_imagegen::{FailingImageGenerator, ImageGenerator, MockImageGenerator};
    use portrait_store_memory::MemoryPortraitRepository;

    use super::*;
    use crate::config::ServiceConfig;

    const ADDR: &str = "0xfeed";

    fn service(
        blobs: &MemoryBlobStore,
        repository: &MemoryPortraitRepository,
        generator: Arc<dyn ImageGenerator>,
    ) -> PortraitService {
        PortraitService::new(
            Arc::new(blobs.clone()),
            Arc::new(repository.clone()),
            generator,
            ServiceConfig::default(),
        )
    }

    #[tokio::test]
    async fn generate_then_save_commits_portrait() {
        let blobs = MemoryBlobStore::new();
        let repository = MemoryPortraitRepository::new();
        let mut session = PortraitSession::new(service(
            &blobs,
            &repository,
            Arc::new(MockImageGenerator::new()),
        ));

        assert_eq!(session.load(ADDR).await.unwrap(), &PortraitPhase::NoPortrait);
        session.generate("a fox", None).await.unwrap();
        assert_eq!(session.phase(), &PortraitPhase::Preview { previous: None });
        assert!(repository.is_empty());

        let record = session.save().await.unwrap();
        assert_eq!(record.prompt.as_deref(), Some("a fox"));
        assert_eq!(
            session.phase(),
            &PortraitPhase::Portrait {
                image_url: "/api/image/portraits/0xfeed.webp".into()
            }
        );
        assert!(session.preview().is_none());
    }

    #[tokio::test]
    async fn cancel_returns_to_committed_portrait() {
        let blobs = MemoryBlobStore::new();
        let repository = MemoryPortraitRepository::new();
        let svc = service(&blobs, &repository, Arc::new(MockImageGenerator::new()));
        svc.save_portrait(ADDR, Bytes::from_static(b"old"), None)
            .await
            .unwrap();

        let mut session = PortraitSession::new(svc);
        session.load(ADDR).await.unwrap();
        session.generate("a fox", None).await.unwrap();
        assert!(session.phase().is_preview());

        let phase = session.cancel().clone();
        assert_eq!(
            phase,
            PortraitPhase::Portrait {
                image_url: "/api/image/portraits/0xfeed.webp".into()
            }
        );
        assert!(session.preview().is_none());
    }

    #[tokio::test]
    async fn failed_generate_keeps_phase() {
        let blobs = MemoryBlobStore::new();
        let repository = MemoryPortraitRepository::new();
        let mut session = PortraitSession::new(service(
            &blobs,
            &repository,
            Arc::new(FailingImageGenerator::new("boom")),
        ));
        session.load(ADDR).await.unwrap();
        assert!(session.generate("a fox", None).await.is_err());
        assert_eq!(session.phase(), &PortraitPhase::NoPortrait);
    }

    #[tokio::test]
    async fn failed_save_keeps_preview_for_retry() {
        let blobs = MemoryBlobStore::new();
        let repository = MemoryPortraitRepository::new();
        let mut session = PortraitSession::new(service(
            &blobs,
            &repository,
            Arc::new(MockImageGenerator::new()),
        ));
        session.load(ADDR).await.unwrap();
        session.generate("a fox", None).await.unwrap();

        blobs.set_unavailable(true);
        assert!(session.save().await.is_err());
        assert!(session.phase().is_preview());
        assert!(session.preview().is_some());

        blobs.set_unavailable(false);
        session.save().await.unwrap();
        assert!(!session.phase().is_preview());
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn save_without_preview_is_rejected() {
        let blobs = MemoryBlobStore::new();
        let repository = MemoryPortraitRepository::new();
        let mut session = PortraitSession::new(service(
            &blobs,
            &repository,
            Arc::new(MockImageGenerator::new()),
        ));
        let err = session.save().await.unwrap_err();
        assert_eq!(err.to_string(), "Address is required");

        session.load(ADDR).await.unwrap();
        let err = session.save().await.unwrap_err();
        assert_eq!(err.to_string(), "No preview to save");
    }
}
