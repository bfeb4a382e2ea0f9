use serde::{Deserialize, Serialize};

/// Configuration for the S3-compatible blob store.
#[derive(Clone, Serialize, Deserialize)]
pub struct S3BlobConfig {
    /// Region name. Cloudflare R2 uses `"auto"`.
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint URL (e.g. `https://<account>.r2.cloudflarestorage.com`).
    pub endpoint_url: Option<String>,

    /// Bucket holding portrait objects.
    pub bucket: String,

    /// Access key ID.
    pub access_key_id: String,

    /// Secret access key.
    pub secret_access_key: String,

    /// Use path-style addressing (`<endpoint>/<bucket>/<key>`).
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,
}

impl std::fmt::Debug for S3BlobConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobConfig")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl S3BlobConfig {
    /// Create a config for `bucket` using the given static credentials.
    pub fn new(
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            force_path_style: default_force_path_style(),
        }
    }

    /// Set the endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Enable or disable path-style addressing.
    #[must_use]
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// The legacy direct-storage URL prefix: `<endpoint>/<bucket>`.
    ///
    /// Returns `None` when no endpoint is configured.
    pub fn direct_url_base(&self) -> Option<String> {
        self.endpoint_url
            .as_deref()
            .map(|endpoint| format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket))
    }
}

fn default_region() -> String {
    "auto".to_owned()
}

fn default_force_path_style() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_defaults() {
        let config = S3BlobConfig::new("images-bucket", "id", "secret");
        assert_eq!(config.region, "auto");
        assert_eq!(config.bucket, "images-bucket");
        assert!(config.endpoint_url.is_none());
        assert!(config.force_path_style);
    }

    #[test]
    fn builder_chain() {
        let config = S3BlobConfig::new("b", "id", "secret")
            .with_endpoint_url("http://localhost:9000")
            .with_region("us-east-1")
            .with_force_path_style(false);
        assert_eq!(
            config.endpoint_url.as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(config.region, "us-east-1");
        assert!(!config.force_path_style);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = S3BlobConfig::new("b", "AKIDEXAMPLE", "super-secret-value");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("AKIDEXAMPLE"));
    }

    #[test]
    fn direct_url_base_joins_endpoint_and_bucket() {
        let config = S3BlobConfig::new("images-bucket", "id", "secret")
            .with_endpoint_url("https://r2.example.com/");
        assert_eq!(
            config.direct_url_base().as_deref(),
            Some("https://r2.example.com/images-bucket")
        );
        assert!(S3BlobConfig::new("b", "i", "s").direct_url_base().is_none());
    }

    #[test]
    fn deserialize_applies_defaults() {
        let json = r#"{"bucket":"b","access_key_id":"i","secret_access_key":"s"}"#;
        let config: S3BlobConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.region, "auto");
        assert!(config.force_path_style);
    }
}
