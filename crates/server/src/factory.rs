use std::sync::Arc;
use std::time::Duration;

use portrait_blob::BlobStore;
use portrait_blob_memory::MemoryBlobStore;
use portrait_blob_s3::{S3BlobConfig, S3BlobStore};
use portrait_imagegen::{ImageGenerator, MockImageGenerator, ReplicateConfig, ReplicateImageGenerator};
use portrait_service::{PortraitService, ServiceConfig};
use portrait_store::PortraitRepository;
use portrait_store_memory::MemoryPortraitRepository;
use portrait_store_postgres::{PostgresConfig, PostgresPortraitRepository};
use tracing::info;

use crate::config::{DatabaseConfig, ImageConfig, PortraitConfig, StorageConfig};
use crate::error::ServerError;

/// The three collaborators behind a [`PortraitService`].
#[derive(Clone)]
pub struct Backends {
    /// Blob store holding image bytes.
    pub blobs: Arc<dyn BlobStore>,
    /// Repository holding portrait records.
    pub repository: Arc<dyn PortraitRepository>,
    /// Image generator used for previews.
    pub generator: Arc<dyn ImageGenerator>,
}

impl Backends {
    /// Build every backend selected by `config`.
    ///
    /// The blob store's readiness check and the database migrations both run
    /// here, so a misconfigured deployment fails before serving requests.
    pub async fn from_config(config: &PortraitConfig) -> Result<Self, ServerError> {
        let blobs = create_blob_store(&config.storage).await?;
        let repository = create_repository(&config.database).await?;
        let generator = create_generator(&config.image)?;
        Ok(Self {
            blobs,
            repository,
            generator,
        })
    }

    /// Wrap the backends in a [`PortraitService`].
    pub fn into_service(self, config: &PortraitConfig) -> PortraitService {
        PortraitService::new(self.blobs, self.repository, self.generator, service_config(config))
    }
}

/// Service settings derived from the server and image sections.
pub fn service_config(config: &PortraitConfig) -> ServiceConfig {
    let mut service = ServiceConfig::default()
        .with_public_base_url(config.server.public_base_url.clone())
        .with_image_format(config.image.output_format);
    if let Some(style) = config.image.default_style.clone() {
        service = service.with_default_style(style);
    }
    service
}

/// Build the S3 client configuration from the storage section.
pub fn s3_config(config: &StorageConfig) -> Result<S3BlobConfig, ServerError> {
    let bucket = required(config.bucket.as_ref(), "storage bucket")?;
    let access_key_id = required(config.access_key_id.as_ref(), "storage access key id")?;
    let secret_access_key =
        required(config.secret_access_key.as_ref(), "storage secret access key")?;

    let mut s3 = S3BlobConfig::new(bucket, access_key_id, secret_access_key)
        .with_region(config.region.clone())
        .with_force_path_style(config.force_path_style);
    if let Some(endpoint) = &config.endpoint {
        s3 = s3.with_endpoint_url(endpoint.clone());
    }
    Ok(s3)
}

/// Create the blob store and make sure it is ready to accept writes.
pub async fn create_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, ServerError> {
    let store: Arc<dyn BlobStore> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryBlobStore::new()),
        "s3" => Arc::new(S3BlobStore::new(s3_config(config)?).await),
        other => {
            return Err(ServerError::Config(format!(
                "unknown storage backend: {other}"
            )));
        }
    };

    store
        .ensure_ready()
        .await
        .map_err(|e| ServerError::Config(format!("blob store not ready: {e}")))?;

    info!(backend = %config.backend, "blob store initialized");
    Ok(store)
}

/// Create the portrait repository, running migrations for persistent backends.
pub async fn create_repository(
    config: &DatabaseConfig,
) -> Result<Arc<dyn PortraitRepository>, ServerError> {
    let repository: Arc<dyn PortraitRepository> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryPortraitRepository::new()),
        "postgres" => {
            let url = required(config.url.as_ref(), "database url")?;
            let pg_config = PostgresConfig {
                url,
                pool_size: config.pool_size,
                schema: config.schema.clone(),
                table_prefix: config.table_prefix.clone(),
                ssl_mode: config.ssl_mode.clone(),
                ssl_root_cert: config.ssl_root_cert.clone(),
            };
            let repository = PostgresPortraitRepository::new(pg_config)
                .await
                .map_err(|e| ServerError::Config(format!("database: {e}")))?;
            Arc::new(repository)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unknown database backend: {other}"
            )));
        }
    };

    info!(backend = %config.backend, "portrait repository initialized");
    Ok(repository)
}

/// Create the image generator.
pub fn create_generator(config: &ImageConfig) -> Result<Arc<dyn ImageGenerator>, ServerError> {
    let generator: Arc<dyn ImageGenerator> = match config.backend.as_str() {
        "mock" => Arc::new(MockImageGenerator::new()),
        "replicate" => {
            let token = required(config.api_token.as_ref(), "image api token")?;
            let replicate = ReplicateConfig::new(token)
                .with_base_url(config.base_url.clone())
                .with_model(config.model.clone())
                .with_timeout(config.timeout_seconds)
                .with_output_format(config.output_format)
                .with_output_quality(config.output_quality)
                .with_inference_steps(config.num_inference_steps);
            let generator = ReplicateImageGenerator::new(replicate)
                .map_err(|e| ServerError::Config(format!("image generator: {e}")))?;
            Arc::new(generator)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unknown image backend: {other}"
            )));
        }
    };

    info!(
        backend = %config.backend,
        timeout = ?Duration::from_secs(config.timeout_seconds),
        "image generator initialized"
    );
    Ok(generator)
}

fn required(value: Option<&String>, what: &str) -> Result<String, ServerError> {
    value
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| ServerError::Config(format!("missing required {what}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> PortraitConfig {
        PortraitConfig::from_toml(
            r#"
            [server]
            public_base_url = "/img"

            [storage]
            backend = "memory"

            [database]
            backend = "memory"

            [image]
            backend = "mock"
            output_format = "png"
            default_style = "Pixel art"
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn memory_backends_build() {
        let config = memory_config();
        let backends = Backends::from_config(&config).await.unwrap();
        let service = backends.into_service(&config);
        assert_eq!(service.config().public_base_url, "/img");
        assert_eq!(
            service.config().image_format,
            portrait_core::ImageFormat::Png
        );
        assert_eq!(service.config().default_style.as_deref(), Some("Pixel art"));
    }

    #[tokio::test]
    async fn unknown_backend_is_config_error() {
        let mut config = memory_config();
        config.database.backend = "sqlite".into();
        assert!(matches!(
            create_repository(&config.database).await,
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn s3_config_maps_fields() {
        let storage = StorageConfig {
            endpoint: Some("https://acct.r2.cloudflarestorage.com/".into()),
            bucket: Some("portraits".into()),
            access_key_id: Some("id".into()),
            secret_access_key: Some("secret".into()),
            ..StorageConfig::default()
        };
        let s3 = s3_config(&storage).unwrap();
        assert_eq!(s3.bucket, "portraits");
        assert_eq!(s3.region, "auto");
        assert!(s3.force_path_style);
        assert_eq!(
            s3.direct_url_base().as_deref(),
            Some("https://acct.r2.cloudflarestorage.com/portraits")
        );
    }

    #[test]
    fn s3_config_requires_bucket() {
        let storage = StorageConfig {
            access_key_id: Some("id".into()),
            secret_access_key: Some("secret".into()),
            ..StorageConfig::default()
        };
        assert!(s3_config(&storage).is_err());
    }

    #[test]
    fn replicate_requires_token() {
        let image = ImageConfig::default();
        assert!(matches!(
            create_generator(&image),
            Err(ServerError::Config(_))
        ));
    }
}
