//! S3-compatible blob store for portrait images.
//!
//! Works against AWS S3 and any service speaking the S3 API (Cloudflare R2,
//! `MinIO`, `LocalStack`). Credentials are static keys taken from
//! [`S3BlobConfig`]; path-style addressing is on by default, which R2 and
//! `MinIO` require.

pub mod auth;
pub mod config;
pub mod error;
pub mod store;

pub use config::S3BlobConfig;
pub use store::S3BlobStore;
