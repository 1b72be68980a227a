//! webmpris daemon - REST endpoint for MPRIS2 media players
//!
//! Connects to the D-Bus session bus, binds the HTTP listener and serves
//! requests until interrupted.

use std::{error::Error, fs, path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::signal;
use tracing::{info, instrument, warn};
use webmpris::{
    api::{self, AppState},
    config::{Config, ConfigPaths},
    dispatch::Dispatcher,
    mpris::DbusGateway,
    tracing_config,
};

#[derive(Parser)]
#[command(name = "webmprisd")]
#[command(about = "REST endpoint to control media players via MPRIS2 interfaces")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Socket address to listen on, overriding the configuration file
    #[arg(short, long)]
    listen: Option<String>,

    /// Also write logs to the webmpris log directory
    #[arg(long)]
    log_file: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.log_file {
        tracing_config::init_with_file()?;
    } else {
        tracing_config::init()?;
    }

    info!("Starting webmpris v{}", env!("CARGO_PKG_VERSION"));

    ensure_webmpris_directories()?;

    let config_path = cli.config.unwrap_or_else(ConfigPaths::main_config);
    let config = Config::load_or_default(&config_path)?;
    let listen = cli.listen.unwrap_or(config.server.listen);

    let gateway = DbusGateway::connect(config.bus.private).await?;
    info!(private = config.bus.private, "Connected to session bus");

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(gateway)));
    let app = api::router(AppState::new(dispatcher));

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("Listening on http://{listen}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[instrument]
fn ensure_webmpris_directories() -> Result<(), Box<dyn Error>> {
    let config_dir = ConfigPaths::config_dir()?;
    if !config_dir.exists() {
        info!("Creating config directory: {}", config_dir.display());
        fs::create_dir_all(&config_dir)?;
    }
    Ok(())
}
