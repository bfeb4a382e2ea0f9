use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::KeyError;

/// Prefix under which all portrait objects are stored.
pub const PORTRAIT_PREFIX: &str = "portraits";

/// Default public base path for the image retrieval route.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "/api/image";

/// Encoded image format produced by generation and used for storage keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// `WebP` (lossy), the default.
    #[default]
    Webp,
    /// PNG.
    Png,
    /// JPEG.
    #[serde(alias = "jpg")]
    Jpeg,
}

impl ImageFormat {
    /// File extension used in storage keys.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// MIME content type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Format for a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "webp" => Some(Self::Webp),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Provider-facing output format name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// An object key inside the blob store.
///
/// Portrait keys are derived deterministically from the address, so a save
/// always overwrites the previous object for that address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive the storage key for an address: `portraits/<address>.<ext>`.
    pub fn for_address(address: &Address, format: ImageFormat) -> Self {
        Self(format!(
            "{PORTRAIT_PREFIX}/{address}.{}",
            format.extension()
        ))
    }

    /// Parse a key taken from a retrieval path (the segments after the
    /// public base URL).
    pub fn parse(path: &str) -> Result<Self, KeyError> {
        if path.is_empty() {
            return Err(KeyError::Empty);
        }
        if path.starts_with('/') {
            return Err(KeyError::InvalidSegment(path.to_owned()));
        }
        let invalid = path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if invalid {
            return Err(KeyError::InvalidSegment(path.to_owned()));
        }
        Ok(Self(path.to_owned()))
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image format implied by the key's extension, if recognized.
    pub fn format(&self) -> Option<ImageFormat> {
        let (_, ext) = self.0.rsplit_once('.')?;
        ImageFormat::from_extension(ext)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the reference path for a stored object: `<base>/<key>`.
pub fn image_url(base: &str, key: &StorageKey) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.as_str())
}

/// Rewrite a legacy direct-storage URL into the retrieval-route form.
///
/// `legacy_base` is the old `<endpoint>/<bucket>` prefix. Returns `None` when
/// the URL does not start with that prefix (already rewritten or foreign).
pub fn rewrite_legacy_url(url: &str, legacy_base: &str, public_base: &str) -> Option<String> {
    let prefix = format!("{}/", legacy_base.trim_end_matches('/'));
    let key = url.strip_prefix(&prefix)?;
    let key = StorageKey::parse(key).ok()?;
    Some(image_url(public_base, &key))
}
