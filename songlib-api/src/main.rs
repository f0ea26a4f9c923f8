//! songlib-api - song library HTTP service
//!
//! Loads configuration from an env file, prepares the Postgres schema, and
//! serves the song API until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use songlib_api::{build_router, services::SongInfoClient, AppState};
use songlib_common::db::init_database;
use songlib_common::Config;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songlib-api
#[derive(Parser, Debug)]
#[command(name = "songlib-api")]
#[command(about = "Song library HTTP service")]
#[command(version)]
struct Args {
    /// Env file holding the POSTGRES_* settings
    #[arg(short, long, default_value = ".env", env = "SONGLIB_ENV_FILE")]
    env_file: PathBuf,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "songlib_api=info,songlib_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting songlib-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config = Config::load(&args.env_file)
        .with_context(|| format!("Failed to load configuration from {}", args.env_file.display()))?;
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let pool = match init_database(&config.db).await {
        Ok(pool) => {
            info!("✓ Connected to database, schema ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let song_info = SongInfoClient::new(config.song_info_url.clone(), config.song_info_timeout)
        .context("Failed to build song info client")?;
    info!("Song info provider: {}", song_info.base_url());

    let state = AppState::new(pool.clone(), song_info).with_request_timeout(config.request_timeout);
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("songlib-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
