use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use portrait_core::ImageFormat;

use crate::error::GenerationError;
use crate::generator::{GeneratedImage, GenerationRequest, ImageGenerator};

/// A mock image generator that returns fixed bytes and counts calls.
#[derive(Debug, Clone)]
pub struct MockImageGenerator {
    image: GeneratedImage,
    calls: Arc<AtomicUsize>,
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageGenerator {
    /// Create a mock that returns a small `WebP` header.
    pub fn new() -> Self {
        Self::with_image(Bytes::from_static(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::Webp)
    }

    /// Create a mock that returns the given bytes.
    pub fn with_image(data: impl Into<Bytes>, format: ImageFormat) -> Self {
        Self {
            image: GeneratedImage {
                data: data.into(),
                format,
            },
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `generate` calls made so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The bytes every call returns.
    pub fn image_data(&self) -> &Bytes {
        &self.image.data
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.image.clone())
    }
}

/// A mock image generator that always returns an error.
#[derive(Debug, Clone)]
pub struct FailingImageGenerator {
    error_message: Option<String>,
}

impl FailingImageGenerator {
    /// Create a generator that fails with [`GenerationError::Api`].
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
        }
    }

    /// Create a generator that reports [`GenerationError::Empty`].
    pub fn empty() -> Self {
        Self {
            error_message: None,
        }
    }
}

#[async_trait]
impl ImageGenerator for FailingImageGenerator {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        match &self.error_message {
            Some(message) => Err(GenerationError::Api(message.clone())),
            None => Err(GenerationError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_image_and_counts() {
        let mock = MockImageGenerator::with_image(&b"png"[..], ImageFormat::Png);
        let clone = mock.clone();
        let image = clone
            .generate(&GenerationRequest::new("a fox"))
            .await
            .unwrap();
        assert_eq!(image.data, Bytes::from_static(b"png"));
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn failing_returns_api_error() {
        let generator = FailingImageGenerator::new("service unavailable");
        let err = generator
            .generate(&GenerationRequest::new("a fox"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Api(ref m) if m == "service unavailable"));
    }

    #[tokio::test]
    async fn failing_empty_returns_empty() {
        let err = FailingImageGenerator::empty()
            .generate(&GenerationRequest::new("a fox"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No image generated");
    }
}
