use portrait_core::ImageFormat;

/// Longest server-side wait Replicate honours for `Prefer: wait=<n>`.
pub const MAX_WAIT_SECONDS: u64 = 60;

/// Seconds reserved after the wait window to receive the response.
const WAIT_MARGIN_SECONDS: u64 = 5;

/// Configuration for the Replicate image generator.
#[derive(Clone)]
pub struct ReplicateConfig {
    /// API base URL (e.g. `https://api.replicate.com`).
    pub base_url: String,
    /// Model identifier in `owner/name` form.
    pub model: String,
    /// API token for authentication.
    pub api_token: String,
    /// Request timeout in seconds. The server-side wait window stays below it.
    pub timeout_seconds: u64,
    /// Output image format.
    pub output_format: ImageFormat,
    /// Lossy compression quality (0-100).
    pub output_quality: u8,
    /// Number of denoising steps.
    pub num_inference_steps: u32,
    /// Aspect ratio, e.g. `"1:1"`.
    pub aspect_ratio: String,
}

impl std::fmt::Debug for ReplicateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicateConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_token", &"[REDACTED]")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("output_format", &self.output_format)
            .field("output_quality", &self.output_quality)
            .field("num_inference_steps", &self.num_inference_steps)
            .field("aspect_ratio", &self.aspect_ratio)
            .finish()
    }
}

impl ReplicateConfig {
    /// Create a new config with the given API token.
    ///
    /// Defaults: `black-forest-labs/flux-schnell`, square `WebP` at quality 80,
    /// 4 inference steps, 60s timeout.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.replicate.com".to_owned(),
            model: "black-forest-labs/flux-schnell".to_owned(),
            api_token: api_token.into(),
            timeout_seconds: 60,
            output_format: ImageFormat::Webp,
            output_quality: 80,
            num_inference_steps: 4,
            aspect_ratio: "1:1".to_owned(),
        }
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the output format.
    #[must_use]
    pub fn with_output_format(mut self, format: ImageFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the output quality.
    #[must_use]
    pub fn with_output_quality(mut self, quality: u8) -> Self {
        self.output_quality = quality;
        self
    }

    /// Set the number of inference steps.
    #[must_use]
    pub fn with_inference_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = steps;
        self
    }

    /// Server-side wait window in seconds, always below the request timeout.
    pub fn wait_seconds(&self) -> u64 {
        self.timeout_seconds
            .saturating_sub(WAIT_MARGIN_SECONDS)
            .clamp(1, MAX_WAIT_SECONDS)
    }

    /// Value of the `Prefer` request header.
    pub fn prefer_header(&self) -> String {
        format!("wait={}", self.wait_seconds())
    }

    /// Predictions endpoint for the configured model.
    pub fn predictions_url(&self) -> String {
        format!(
            "{}/v1/models/{}/predictions",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}
