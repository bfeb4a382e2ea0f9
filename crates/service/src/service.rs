use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use portrait_blob::{BlobLookup, BlobStore, StoredObject};
use portrait_core::{Address, PortraitRecord, StorageKey, image_url, normalize_prompt};
use portrait_imagegen::{GeneratedImage, GenerationRequest, ImageGenerator};
use portrait_store::PortraitRepository;

use crate::config::ServiceConfig;
use crate::error::PortraitError;

const FETCH_FAILED: &str = "Failed to retrieve portrait";
const GENERATE_FAILED: &str = "Failed to generate portrait";
const SAVE_FAILED: &str = "Failed to save portrait";
const RETRIEVE_FAILED: &str = "Error retrieving image";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Orchestrates the blob store, the repository and the image generator.
///
/// All collaborators are injected once at startup and shared across
/// requests; the service itself holds no mutable state.
#[derive(Clone)]
pub struct PortraitService {
    blobs: Arc<dyn BlobStore>,
    repository: Arc<dyn PortraitRepository>,
    generator: Arc<dyn ImageGenerator>,
    config: ServiceConfig,
}

impl std::fmt::Debug for PortraitService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortraitService")
            .field("generator", &self.generator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PortraitService {
    /// Create a service over the given collaborators.
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        repository: Arc<dyn PortraitRepository>,
        generator: Arc<dyn ImageGenerator>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            blobs,
            repository,
            generator,
            config,
        }
    }

    /// The service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Look up the committed portrait for an address.
    ///
    /// `Ok(None)` means the address has never been saved; that is a normal
    /// outcome, not an error.
    #[instrument(skip(self))]
    pub async fn fetch_portrait(
        &self,
        raw_address: &str,
    ) -> Result<Option<PortraitRecord>, PortraitError> {
        if raw_address.trim().is_empty() {
            return Err(PortraitError::validation("Address is required"));
        }
        let address = parse_address(raw_address)?;

        let record = self
            .repository
            .find_by_address(&address)
            .await
            .map_err(|e| PortraitError::upstream(FETCH_FAILED, e))?;

        debug!(address = %address, found = record.is_some(), "portrait fetched");
        Ok(record)
    }

    /// Generate a preview image. Nothing is persisted.
    ///
    /// A blank prompt fails validation without contacting the provider.
    #[instrument(skip(self, prompt, style))]
    pub async fn generate_portrait(
        &self,
        prompt: &str,
        style: Option<&str>,
    ) -> Result<GeneratedImage, PortraitError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(PortraitError::validation("Prompt is required"));
        }

        let mut request = GenerationRequest::new(prompt);
        let style = style
            .filter(|s| !s.trim().is_empty())
            .or(self.config.default_style.as_deref());
        if let Some(style) = style {
            request = request.with_style(style);
        }

        let image = self
            .generator
            .generate(&request)
            .await
            .map_err(|e| PortraitError::upstream(GENERATE_FAILED, e))?;

        debug!(bytes = image.data.len(), format = image.format.as_str(), "preview generated");
        Ok(image)
    }

    /// Commit image bytes for an address.
    ///
    /// The blob is written first; the repository is only touched once the
    /// blob write succeeded. A repository failure after that point leaves
    /// the blob in place; the next save for the same address overwrites it.
    #[instrument(skip(self, data, prompt), fields(bytes = data.len()))]
    pub async fn save_portrait(
        &self,
        raw_address: &str,
        data: Bytes,
        prompt: Option<&str>,
    ) -> Result<PortraitRecord, PortraitError> {
        if raw_address.trim().is_empty() || data.is_empty() {
            return Err(PortraitError::validation(
                "Address and image data are required",
            ));
        }
        let address = parse_address(raw_address)?;
        let format = self.config.image_format;
        let key = StorageKey::for_address(&address, format);

        self.blobs
            .put(&key, data, format.content_type())
            .await
            .map_err(|e| PortraitError::upstream(SAVE_FAILED, e))?;

        let url = image_url(&self.config.public_base_url, &key);
        let prompt = normalize_prompt(prompt);

        let record = match self
            .repository
            .upsert(&address, &url, prompt.as_deref())
            .await
        {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "blob written but record upsert failed; blob is orphaned");
                return Err(PortraitError::upstream(SAVE_FAILED, e));
            }
        };

        info!(address = %address, key = %key, "portrait saved");
        Ok(record)
    }

    /// Fetch stored image bytes by retrieval path.
    ///
    /// The returned object always carries a content type, inferred from the
    /// key extension when the store did not record one.
    #[instrument(skip(self))]
    pub async fn retrieve_image(&self, path: &str) -> Result<StoredObject, PortraitError> {
        if path.is_empty() {
            return Err(PortraitError::validation("Image path is required"));
        }
        let key =
            StorageKey::parse(path).map_err(|_| PortraitError::validation("Invalid image path"))?;

        let lookup = self
            .blobs
            .get(&key)
            .await
            .map_err(|e| PortraitError::upstream(RETRIEVE_FAILED, e))?;

        match lookup {
            BlobLookup::Found(mut object) => {
                if object.content_type.is_none() {
                    let inferred = key
                        .format()
                        .map_or(FALLBACK_CONTENT_TYPE, |f| f.content_type());
                    object.content_type = Some(inferred.to_owned());
                }
                Ok(object)
            }
            BlobLookup::NotFound => {
                debug!(key = %key, "image not found");
                Err(PortraitError::NotFound("Image not found".into()))
            }
        }
    }
}

fn parse_address(raw: &str) -> Result<Address, PortraitError> {
    Address::parse(raw).map_err(|e| PortraitError::Validation(format!("Invalid address: {e}")))
}
