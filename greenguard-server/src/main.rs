//! # GreenGuard Server
//!
//! Scheduled ingestion of agronomic signals (current weather, vegetation
//! index) for registered land parcels, persisted as append-only observations
//! in PostgreSQL, with a small HTTP control surface for liveness and manual
//! cadence triggers.
//!
//! The server is built on Axum and uses:
//! - PostgreSQL (sqlx) for observation storage
//! - reqwest against the AgroMonitoring API
//! - a single background tokio task for the dual-cadence scheduler

use anyhow::Context;
use clap::Parser;
use greenguard_server::{
    AppState, Config,
    routes,
};
use greenguard_core::{AgroApiProvider, IngestPipeline, PostgresStore, Scheduler};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "greenguard-server")]
#[command(about = "Scheduled agronomic data ingestion with an HTTP control surface")]
struct Cli {
    /// Listener port (overrides config)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Listener host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,greenguard_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ConfigMissing is fatal: without a store or an API key there is nothing
    // to ingest, so refuse to start.
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(host) = cli.host {
        config.server_host = host;
    }
    let config = Arc::new(config);

    info!(
        weather_interval_secs = config.weather_interval_secs,
        ndvi_interval_secs = config.ndvi_interval_secs,
        "starting greenguard ingestion service"
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    let provider = Arc::new(AgroApiProvider::new(
        &config.agro_base_url,
        &config.agro_api_key,
    ));
    let store = Arc::new(PostgresStore::new(pool));
    let pipeline = Arc::new(IngestPipeline::new(provider, store));

    let (scheduler, cadences) = Scheduler::new(pipeline.clone(), config.scheduler());
    tokio::spawn(scheduler.run());

    let state = AppState {
        pipeline,
        cadences,
        config: config.clone(),
    };
    let app = routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .context("invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("control surface on http://{addr}");
    info!("  GET /health          - service status");
    info!("  GET /trigger/weather - manual weather fetch");
    info!("  GET /trigger/ndvi    - manual NDVI fetch");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
