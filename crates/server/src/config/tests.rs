use std::collections::HashMap;

use portrait_core::ImageFormat;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |name| map.get(name).cloned()
}

fn memory_config() -> PortraitConfig {
    PortraitConfig::from_toml(
        r#"
        [storage]
        backend = "memory"

        [database]
        backend = "memory"

        [image]
        backend = "mock"
        "#,
    )
    .unwrap()
}

#[test]
fn defaults() {
    let config = PortraitConfig::from_toml("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.body_limit_bytes, 10 * 1024 * 1024);
    assert_eq!(config.server.public_base_url, "/api/image");
    assert!(config.server.cors_origins.is_empty());
    assert_eq!(config.storage.backend, "s3");
    assert_eq!(config.storage.region, "auto");
    assert!(config.storage.force_path_style);
    assert_eq!(config.database.backend, "postgres");
    assert_eq!(config.database.pool_size, 5);
    assert_eq!(config.database.schema, "public");
    assert_eq!(config.image.backend, "replicate");
    assert_eq!(config.image.model, "black-forest-labs/flux-schnell");
    assert_eq!(config.image.output_format, ImageFormat::Webp);
    assert_eq!(config.image.output_quality, 80);
    assert_eq!(config.image.num_inference_steps, 4);
    assert_eq!(config.logging.format, LogFormat::Text);
}

#[test]
fn custom_sections() {
    let config = PortraitConfig::from_toml(
        r#"
        [server]
        host = "0.0.0.0"
        port = 3000
        cors_origins = ["https://app.example.com"]
        public_base_url = "https://cdn.example.com/img"

        [storage]
        endpoint = "https://acct.r2.cloudflarestorage.com"
        bucket = "portraits"
        access_key_id = "id"
        secret_access_key = "secret"

        [database]
        url = "postgres://localhost/portraits"
        table_prefix = "app_"

        [image]
        api_token = "r8_token"
        output_format = "png"
        default_style = "Pixel art"

        [logging]
        format = "json"
        "#,
    )
    .unwrap();

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.cors_origins, vec!["https://app.example.com"]);
    assert_eq!(config.storage.bucket.as_deref(), Some("portraits"));
    assert_eq!(config.database.table_prefix, "app_");
    assert_eq!(config.image.output_format, ImageFormat::Png);
    assert_eq!(config.image.default_style.as_deref(), Some("Pixel art"));
    assert_eq!(config.logging.format, LogFormat::Json);
    config.validate().unwrap();
}

#[test]
fn invalid_toml_is_config_error() {
    assert!(matches!(
        PortraitConfig::from_toml("[server]\nport = \"eighty\""),
        Err(ServerError::Config(_))
    ));
}

#[test]
fn missing_file_uses_defaults() {
    let (config, loaded) = PortraitConfig::load("/nonexistent/portrait.toml").unwrap();
    assert!(!loaded);
    assert_eq!(config.server.port, 8080);
}

#[test]
fn default_backends_require_credentials() {
    let config = PortraitConfig::default();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("R2_ENDPOINT"));
}

#[test]
fn memory_backends_validate_without_credentials() {
    memory_config().validate().unwrap();
}

#[test]
fn env_overrides_fill_required_values() {
    let mut config = PortraitConfig::default();
    config
        .apply_env_overrides(env(&[
            ("R2_ENDPOINT", "https://acct.r2.cloudflarestorage.com"),
            ("R2_ACCESS_KEY_ID", "id"),
            ("R2_SECRET_ACCESS_KEY", "secret"),
            ("R2_BUCKET", "portraits"),
            ("DATABASE_URL", "postgres://localhost/portraits"),
            ("REPLICATE_API_TOKEN", "r8_token"),
            ("PORTRAIT_HOST", "0.0.0.0"),
            ("PORTRAIT_PORT", "9000"),
        ]))
        .unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.storage.bucket.as_deref(), Some("portraits"));
    config.validate().unwrap();
}

#[test]
fn env_overrides_take_precedence_over_file() {
    let mut config = PortraitConfig::from_toml(
        r#"
        [storage]
        bucket = "from-file"
        "#,
    )
    .unwrap();
    config
        .apply_env_overrides(env(&[("R2_BUCKET", "from-env")]))
        .unwrap();
    assert_eq!(config.storage.bucket.as_deref(), Some("from-env"));
}

#[test]
fn empty_env_values_are_ignored() {
    let mut config = memory_config();
    config
        .apply_env_overrides(env(&[("PORTRAIT_HOST", "  ")]))
        .unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn invalid_port_env_is_rejected() {
    let mut config = memory_config();
    let err = config
        .apply_env_overrides(env(&[("PORTRAIT_PORT", "http")]))
        .unwrap_err();
    assert!(err.to_string().contains("PORTRAIT_PORT"));
}

#[test]
fn missing_database_url_fails() {
    let mut config = memory_config();
    config.database.backend = "postgres".into();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("DATABASE_URL"));
}

#[test]
fn missing_api_token_fails() {
    let mut config = memory_config();
    config.image.backend = "replicate".into();
    config.image.api_token = Some(" ".into());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("REPLICATE_API_TOKEN"));
}

#[test]
fn unknown_backend_fails() {
    let mut config = memory_config();
    config.storage.backend = "ftp".into();
    assert!(
        config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("unknown storage backend")
    );
}

#[test]
fn quality_out_of_range_fails() {
    let mut config = memory_config();
    config.image.output_quality = 101;
    assert!(config.validate().is_err());
}

#[test]
fn debug_redacts_secrets() {
    let mut config = memory_config();
    config.storage.secret_access_key = Some("s3-secret".into());
    config.database.url = Some("postgres://u:db-secret@h/d".into());
    config.image.api_token = Some("r8_secret".into());
    let debug = format!("{config:?}");
    assert!(!debug.contains("s3-secret"));
    assert!(!debug.contains("db-secret"));
    assert!(!debug.contains("r8_secret"));
}
