use portrait_core::{DEFAULT_PUBLIC_BASE_URL, ImageFormat};

/// Settings that shape the keys and reference paths the service produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base path prepended to storage keys to form `imageUrl`.
    pub public_base_url: String,
    /// Format of generated images; also decides the storage key extension.
    pub image_format: ImageFormat,
    /// Style used when a generate call does not supply one.
    pub default_style: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
            image_format: ImageFormat::default(),
            default_style: None,
        }
    }
}

impl ServiceConfig {
    /// Set the public base URL.
    #[must_use]
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = base.into();
        self
    }

    /// Set the fallback style description.
    #[must_use]
    pub fn with_default_style(mut self, style: impl Into<String>) -> Self {
        self.default_style = Some(style.into());
        self
    }

    /// Set the image format.
    #[must_use]
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }
}
