use serde::Deserialize;

/// Configuration for the blob storage backend.
#[derive(Deserialize)]
pub struct StorageConfig {
    /// Which backend to use: `"s3"` or `"memory"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// S3-compatible endpoint URL (e.g. an R2 account endpoint).
    pub endpoint: Option<String>,
    /// Region. R2 expects `"auto"`.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket holding portrait objects.
    pub bucket: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Use path-style addressing (`<endpoint>/<bucket>/<key>`).
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: None,
            region: default_region(),
            bucket: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: default_force_path_style(),
        }
    }
}

fn default_backend() -> String {
    "s3".to_owned()
}

fn default_region() -> String {
    "auto".to_owned()
}

fn default_force_path_style() -> bool {
    true
}
