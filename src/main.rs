//! Racing Standings API
//!
//! REST API over a fixed team/driver catalog and an in-memory race ledger,
//! with derived driver and team championship standings.

mod catalog;
mod cli;
mod config;
mod error;
mod filter;
mod ledger;
mod routes;
mod standings;
mod types;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::Catalog;
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            teams,
            drivers,
        } => run_server(host, port, teams, drivers).await,
        Commands::Standings {
            input,
            format,
            teams,
            drivers,
        } => cli::run_standings(input, format, teams, drivers),
    }
}

/// Run the API server.
async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    teams: Option<PathBuf>,
    drivers: Option<PathBuf>,
) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "racing_standings_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }
    cli::apply_catalog_overrides(&mut config, teams, drivers);

    tracing::info!("Configuration loaded");
    tracing::info!("Teams: {}", config.catalog.teams_path);
    tracing::info!("Drivers: {}", config.catalog.drivers_path);

    let catalog = Catalog::load(&config.catalog.teams_path, &config.catalog.drivers_path)?;

    // Races are held in memory only and start empty on every launch
    let state = Arc::new(AppState::new(catalog, config.server.base_url()));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
