use async_trait::async_trait;
use bytes::Bytes;
use portrait_core::ImageFormat;

use crate::error::GenerationError;

/// Style description used when the caller does not supply one.
pub const DEFAULT_STYLE: &str = "Create a portrait with a whimsical, hand-drawn animation style. \
Use soft, watercolor-like backgrounds, vibrant colors, and expressive eyes. \
The character should have a sense of wonder and innocence, with detailed but simplified features. \
Include delicate background elements like flowing grass, sparkles, or soft clouds to evoke a \
dreamy, nostalgic atmosphere.";

/// A request for one generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Subject description. Must be non-empty.
    pub prompt: String,
    /// Optional style description replacing [`DEFAULT_STYLE`].
    pub style: Option<String>,
}

impl GenerationRequest {
    /// Create a request using the default style.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: None,
        }
    }

    /// Override the style description.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// The full instruction sent to the provider.
    pub fn instruction(&self) -> String {
        build_instruction(&self.prompt, self.style.as_deref())
    }
}

/// Combine style and subject into one instruction: `"<style>: <prompt>"`.
///
/// A blank style falls back to [`DEFAULT_STYLE`].
pub fn build_instruction(prompt: &str, style: Option<&str>) -> String {
    let style = style
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STYLE);
    format!("{style}: {prompt}")
}

/// Raw bytes of one generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Encoded image bytes.
    pub data: Bytes,
    /// Encoding of `data`.
    pub format: ImageFormat,
}

/// Text-to-image provider.
///
/// One call produces exactly one image. Implementations make a single
/// attempt and never retry.
#[async_trait]
pub trait ImageGenerator: Send + Sync + std::fmt::Debug {
    /// Generate an image for `request`.
    async fn generate(&self, request: &GenerationRequest)
    -> Result<GeneratedImage, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_uses_default_style() {
        let req = GenerationRequest::new("a fox in a scarf");
        let instruction = req.instruction();
        assert!(instruction.starts_with("Create a portrait with a whimsical"));
        assert!(instruction.ends_with(": a fox in a scarf"));
    }

    #[test]
    fn instruction_uses_override() {
        let req = GenerationRequest::new("a fox").with_style("Pixel art");
        assert_eq!(req.instruction(), "Pixel art: a fox");
    }

    #[test]
    fn blank_style_falls_back() {
        assert_eq!(
            build_instruction("a fox", Some("  ")),
            format!("{DEFAULT_STYLE}: a fox")
        );
    }
}
