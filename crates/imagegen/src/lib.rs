pub mod config;
pub mod error;
pub mod generator;
pub mod mock;
pub mod replicate;

pub use config::ReplicateConfig;
pub use error::GenerationError;
pub use generator::{
    DEFAULT_STYLE, GeneratedImage, GenerationRequest, ImageGenerator, build_instruction,
};
pub use mock::{FailingImageGenerator, MockImageGenerator};
pub use replicate::ReplicateImageGenerator;
