use portrait_core::DEFAULT_PUBLIC_BASE_URL;
use serde::Deserialize;

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Graceful shutdown timeout in seconds.
    ///
    /// Upper bound on waiting for in-flight requests and closing the
    /// database pool after a shutdown signal.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
    /// Maximum accepted request body size in bytes. Saves carry a base64
    /// image, so this must exceed the largest expected portrait by a third.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Base path (or absolute URL) prepended to storage keys in `imageUrl`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
            body_limit_bytes: default_body_limit(),
            cors_origins: Vec::new(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_public_base_url() -> String {
    DEFAULT_PUBLIC_BASE_URL.to_owned()
}
