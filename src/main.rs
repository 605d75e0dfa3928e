use anyhow::Result;
use axum::{extract::Request, ServiceExt};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motorlot::auth::ensure_admin_account;
use motorlot::config::Config;
use motorlot::AppState;

#[derive(Parser, Debug)]
#[command(name = "motorlot")]
#[command(author, version, about = "Server-rendered dealership inventory and accounts", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "motorlot.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Motorlot v{}", env!("CARGO_PKG_VERSION"));

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir)?;

    // Initialize database
    let db = motorlot::db::init(&config.server.data_dir).await?;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), db)?);

    // Ensure the configured admin account exists
    ensure_admin_account(&state.accounts, &config.auth).await?;

    // Clear out sessions left over from earlier runs
    let purged = state.sessions.purge_expired().await;
    if purged > 0 {
        tracing::info!("Purged {} expired sessions", purged);
    }

    let app = motorlot::web::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
