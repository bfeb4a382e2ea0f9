mod database;
mod image;
mod logging;
mod server;
mod storage;

#[cfg(test)]
mod tests;

pub use database::*;
pub use image::*;
pub use logging::*;
pub use server::*;
pub use storage::*;

use std::path::Path;

use serde::Deserialize;

use crate::error::ServerError;

/// Top-level configuration for the portrait server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct PortraitConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Portrait record backend configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Image generation backend configuration.
    #[serde(default)]
    pub image: ImageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PortraitConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(format!("invalid config: {e}")))
    }

    /// Load the configuration file at `path`, falling back to defaults when
    /// it does not exist. The flag reports whether a file was read.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, bool), ServerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok((Self::default(), false));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Ok((Self::from_toml(&contents)?, true))
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ServerError> {
        self.apply_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply environment overrides using `lookup` to read variables.
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("R2_ENDPOINT") {
            self.storage.endpoint = Some(v);
        }
        if let Some(v) = var("R2_ACCESS_KEY_ID") {
            self.storage.access_key_id = Some(v);
        }
        if let Some(v) = var("R2_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = Some(v);
        }
        if let Some(v) = var("R2_BUCKET") {
            self.storage.bucket = Some(v);
        }
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = var("REPLICATE_API_TOKEN") {
            self.image.api_token = Some(v);
        }
        if let Some(v) = var("PORTRAIT_HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PORTRAIT_PORT") {
            self.server.port = v
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid PORTRAIT_PORT: {v}")))?;
        }
        Ok(())
    }

    /// Check that every value the selected backends need is present.
    pub fn validate(&self) -> Result<(), ServerError> {
        match self.storage.backend.as_str() {
            "memory" => {}
            "s3" => {
                require(self.storage.endpoint.as_ref(), "storage endpoint (R2_ENDPOINT)")?;
                require(self.storage.bucket.as_ref(), "storage bucket (R2_BUCKET)")?;
                require(
                    self.storage.access_key_id.as_ref(),
                    "storage access key id (R2_ACCESS_KEY_ID)",
                )?;
                require(
                    self.storage.secret_access_key.as_ref(),
                    "storage secret access key (R2_SECRET_ACCESS_KEY)",
                )?;
            }
            other => {
                return Err(ServerError::Config(format!(
                    "unknown storage backend: {other}"
                )));
            }
        }

        match self.database.backend.as_str() {
            "memory" => {}
            "postgres" => {
                require(self.database.url.as_ref(), "database url (DATABASE_URL)")?;
            }
            other => {
                return Err(ServerError::Config(format!(
                    "unknown database backend: {other}"
                )));
            }
        }

        match self.image.backend.as_str() {
            "mock" => {}
            "replicate" => {
                require(
                    self.image.api_token.as_ref(),
                    "image api token (REPLICATE_API_TOKEN)",
                )?;
            }
            other => {
                return Err(ServerError::Config(format!(
                    "unknown image backend: {other}"
                )));
            }
        }

        if self.image.output_quality > 100 {
            return Err(ServerError::Config(format!(
                "image output_quality must be 0-100, got {}",
                self.image.output_quality
            )));
        }
        if self.server.body_limit_bytes == 0 {
            return Err(ServerError::Config(
                "server body_limit_bytes must be positive".into(),
            ));
        }
        if self.server.public_base_url.trim().is_empty() {
            return Err(ServerError::Config(
                "server public_base_url must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn require(value: Option<&String>, what: &str) -> Result<(), ServerError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ServerError::Config(format!("missing required {what}"))),
    }
}
