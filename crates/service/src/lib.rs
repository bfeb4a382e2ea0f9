//! Portrait workflow: fetch the committed record, generate a preview that is
//! never persisted, save a preview to blob storage plus the repository, and
//! serve stored image bytes.

pub mod config;
pub mod error;
pub mod service;
pub mod session;

pub use config::ServiceConfig;
pub use error::{PortraitError, UpstreamError};
pub use service::PortraitService;
pub use session::PortraitSession;
