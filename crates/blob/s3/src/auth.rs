use aws_sdk_s3::config::Credentials;
use tracing::debug;

use crate::config::S3BlobConfig;

/// Build an S3 client from the given [`S3BlobConfig`].
///
/// Credentials are the static key pair from the config rather than the
/// ambient AWS credential chain, so an R2 deployment does not pick up
/// unrelated AWS credentials from the environment.
pub async fn build_client(config: &S3BlobConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        config.access_key_id.clone(),
        config.secret_access_key.clone(),
        None,
        None,
        "portrait-static",
    );

    let mut loader = aws_config::from_env()
        .region(aws_config::Region::new(config.region.clone()))
        .credentials_provider(credentials);

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom S3 endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.force_path_style)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
