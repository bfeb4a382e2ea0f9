use portrait_core::ImageFormat;
use serde::Deserialize;

/// Configuration for the image generation backend.
#[derive(Deserialize)]
pub struct ImageConfig {
    /// Which backend to use: `"replicate"` or `"mock"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Provider API token.
    pub api_token: Option<String>,
    /// Provider base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Style description replacing the built-in default.
    pub default_style: Option<String>,
    /// Output format; also the extension of stored portraits.
    #[serde(default)]
    pub output_format: ImageFormat,
    /// Lossy compression quality (0-100).
    #[serde(default = "default_output_quality")]
    pub output_quality: u8,
    /// Number of denoising steps.
    #[serde(default = "default_inference_steps")]
    pub num_inference_steps: u32,
}

impl std::fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageConfig")
            .field("backend", &self.backend)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("default_style", &self.default_style)
            .field("output_format", &self.output_format)
            .field("output_quality", &self.output_quality)
            .field("num_inference_steps", &self.num_inference_steps)
            .finish()
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            api_token: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            default_style: None,
            output_format: ImageFormat::default(),
            output_quality: default_output_quality(),
            num_inference_steps: default_inference_steps(),
        }
    }
}

fn default_backend() -> String {
    "replicate".to_owned()
}

fn default_base_url() -> String {
    "https://api.replicate.com".to_owned()
}

fn default_model() -> String {
    "black-forest-labs/flux-schnell".to_owned()
}

fn default_timeout() -> u64 {
    60
}

fn default_output_quality() -> u8 {
    80
}

fn default_inference_steps() -> u32 {
    4
}
