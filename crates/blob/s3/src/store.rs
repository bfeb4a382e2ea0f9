use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, error, info, instrument, warn};

use portrait_blob::{BlobError, BlobLookup, BlobStore, StoredObject};
use portrait_core::StorageKey;

use crate::auth::build_client;
use crate::config::S3BlobConfig;
use crate::error::classify_sdk_error;

/// S3-compatible implementation of [`BlobStore`].
pub struct S3BlobStore {
    config: S3BlobConfig,
    client: aws_sdk_s3::Client,
}

impl std::fmt::Debug for S3BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobStore")
            .field("config", &self.config)
            .field("client", &"<S3Client>")
            .finish()
    }
}

impl S3BlobStore {
    /// Create a new `S3BlobStore` by building an SDK client from `config`.
    pub async fn new(config: S3BlobConfig) -> Self {
        let client = build_client(&config).await;
        Self { config, client }
    }

    /// Create an `S3BlobStore` with a pre-built client (for testing).
    pub fn with_client(config: S3BlobConfig, client: aws_sdk_s3::Client) -> Self {
        Self { config, client }
    }

    /// The configured bucket.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self, data), fields(bucket = %self.config.bucket, key = %key, size = data.len()))]
    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobError> {
        debug!("uploading object to S3");

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key.as_str())
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "S3 put_object failed");
                classify_sdk_error(&err_str)
            })?;

        info!("S3 object uploaded");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket, key = %key))]
    async fn get(&self, key: &StorageKey) -> Result<BlobLookup, BlobError> {
        debug!("downloading object from S3");

        let result = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key.as_str())
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    debug!("S3 object not found");
                    return Ok(BlobLookup::NotFound);
                }
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "S3 get_object failed");
                return Err(classify_sdk_error(&err_str));
            }
        };

        let content_type = output.content_type().map(str::to_owned);
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| BlobError::Connection(format!("failed to read S3 body: {e}")))?
            .into_bytes();

        debug!(size = data.len(), "S3 object downloaded");
        Ok(BlobLookup::Found(StoredObject { data, content_type }))
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn ensure_ready(&self) -> Result<(), BlobError> {
        match self
            .client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
        {
            Ok(_) => {
                debug!("bucket exists");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %DisplayErrorContext(&e), "bucket not reachable, attempting to create it");
            }
        }

        self.client
            .create_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "failed to create bucket");
                classify_sdk_error(&err_str)
            })?;

        info!("bucket created");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn health_check(&self) -> Result<(), BlobError> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "S3 health check failed");
                classify_sdk_error(&err_str)
            })?;
        Ok(())
    }
}
