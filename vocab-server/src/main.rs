//! vocab-server - personal vocabulary notebook service
//!
//! Resolves configuration, opens the database and serves the HTTP API until
//! Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use vocab_common::config::{ConfigOverrides, ServiceConfig};
use vocab_common::db::init_database;
use vocab_common::events::EventBus;
use vocab_server::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "vocab-server")]
#[command(about = "Personal vocabulary notebook service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "VOCAB_CONFIG")]
    config: Option<PathBuf>,

    /// Path to SQLite database file
    #[arg(short, long, env = "VOCAB_DATABASE")]
    database: Option<PathBuf>,

    /// HTTP server port
    #[arg(short, long, env = "VOCAB_PORT")]
    port: Option<u16>,

    /// HTTP bind address
    #[arg(short, long, env = "VOCAB_BIND")]
    bind: Option<String>,

    /// Log filter, e.g. `info` or `vocab_server=debug,sqlx=warn`
    #[arg(long, env = "VOCAB_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        database_path: args.database,
        port: args.port,
        bind_address: args.bind,
        log_level: args.log_level,
    };
    let config = ServiceConfig::resolve(args.config.as_deref(), overrides)
        .context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level when set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting vocab-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e).context("Database initialization failed");
        }
    };

    let state = AppState::new(pool, EventBus::new(config.event_bus_capacity));
    let app = build_router(state);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("vocab-server listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
