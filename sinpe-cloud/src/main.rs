//! sinpe-cloud: SINPE merchant back office
//!
//! Long-running service that:
//! - Keeps the merchant, configuration, cash register and employee directories
//! - Records received SINPE mobile payments and their synchronization
//! - Generates monthly commission reports
//! - Serves the Sync API to merchant systems (bearer token)
//! - Appends every change and system failure to the audit log

mod api;
mod auth;
mod config;
mod db;
mod error;
mod service;
mod state;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sinpe_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting sinpe-cloud (env: {})", config.environment);

    let pool = db::connect(&config.database_url).await?;
    let http_port = config.http_port;
    let state = AppState::new(pool, config);

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("sinpe-cloud HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sinpe-cloud stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
