pub mod config;
pub mod migrations;
pub mod repository;

pub use config::PostgresConfig;
pub use repository::PostgresPortraitRepository;
