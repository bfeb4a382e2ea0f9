use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use portrait_server::api::{self, AppState};
use portrait_server::config::PortraitConfig;
use portrait_server::factory::{self, Backends};
use portrait_server::maintenance;

/// Portrait HTTP server.
#[derive(Parser, Debug)]
#[command(name = "portrait-server", about = "HTTP server for AI portraits")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "portrait.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the portrait table if it does not exist, then exit.
    Migrate,
    /// Rewrite stored direct-storage image URLs into retrieval-route paths.
    RewriteUrls {
        /// Legacy URL prefix (`<endpoint>/<bucket>`). Defaults to the one
        /// derived from the `[storage]` section.
        #[arg(long)]
        legacy_base: Option<String>,

        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut config, loaded) = PortraitConfig::load(&cli.config)?;
    config.apply_env()?;
    if let Some(host) = cli.host.clone() {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    portrait_server::telemetry::init(&config.logging);

    if !loaded {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    match cli.command {
        Some(Commands::Migrate) => run_migrate(&config).await,
        Some(Commands::RewriteUrls {
            legacy_base,
            dry_run,
        }) => run_rewrite_urls(&config, legacy_base, dry_run).await,
        None => run_server(&config).await,
    }
}

async fn run_server(config: &PortraitConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let backends = Backends::from_config(config).await?;
    let repository = Arc::clone(&backends.repository);
    let blobs = Arc::clone(&backends.blobs);
    let service = backends.into_service(config);

    let state = AppState::new(service, blobs, Arc::clone(&repository))
        .with_body_limit(config.server.body_limit_bytes)
        .with_cors_origins(config.server.cors_origins.clone());
    let app = api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "portrait-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    if tokio::time::timeout(shutdown_timeout, repository.close())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = config.server.shutdown_timeout_seconds,
            "shutdown timeout exceeded while closing the database pool"
        );
    }

    info!("portrait-server shut down");
    Ok(())
}

/// Run database migrations for the configured repository, then exit.
async fn run_migrate(config: &PortraitConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.database.backend, "running repository migrations...");
    let repository = factory::create_repository(&config.database).await?;
    repository.close().await;
    info!(backend = %config.database.backend, "repository migrations complete");
    Ok(())
}

async fn run_rewrite_urls(
    config: &PortraitConfig,
    legacy_base: Option<String>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let legacy_base = match legacy_base {
        Some(base) => base,
        None => factory::s3_config(&config.storage)?
            .direct_url_base()
            .ok_or("--legacy-base is required when no storage endpoint is configured")?,
    };

    let repository = factory::create_repository(&config.database).await?;
    let summary = maintenance::rewrite_urls(
        repository.as_ref(),
        &legacy_base,
        &config.server.public_base_url,
        dry_run,
    )
    .await?;
    repository.close().await;

    info!(
        rewritten = summary.rewritten,
        skipped = summary.skipped,
        dry_run,
        "image url rewrite complete"
    );
    Ok(())
}

/// Wait for a SIGINT (Ctrl-C) or SIGTERM signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
