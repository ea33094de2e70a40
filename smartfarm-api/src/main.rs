//! SmartFarm API - Main entry point
//!
//! CRUD backend for smallholder farming data: crop catalogue, market
//! prices, suppliers, yield forecasts, and support tickets, plus a
//! WebSocket telemetry feed of simulated sensor metrics.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartfarm_api::api::{self, AppContext};
use smartfarm_api::state::SharedState;
use smartfarm_api::telemetry;
use smartfarm_common::api::load_jwt_secret;
use smartfarm_common::config::resolve_database_path;
use smartfarm_common::db::init_database;

/// Command-line arguments for smartfarm-api
#[derive(Parser, Debug)]
#[command(name = "smartfarm-api")]
#[command(about = "SmartFarm REST API service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "SMARTFARM_PORT")]
    port: u16,

    /// Path to the SQLite database file
    #[arg(short, long, env = "SMARTFARM_DB")]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartfarm_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting SmartFarm API on port {}", args.port);

    let db_path = resolve_database_path(args.database.as_deref(), "SMARTFARM_DB")
        .context("Failed to resolve database path")?;
    info!("Database: {}", db_path.display());

    let db_pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let jwt_secret = load_jwt_secret(&db_pool)
        .await
        .context("Failed to load JWT secret")?;

    let state = Arc::new(SharedState::new());

    // Background task producing simulated sensor readings
    telemetry::spawn_metrics_task(state.clone());

    let ctx = AppContext {
        db_pool,
        state,
        jwt_secret,
    };
    let app = api::create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

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
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
