use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use spraylog_api::config;
use spraylog_api::database::{DatabaseManager, PgApplicationStore};
use spraylog_api::handlers::{self, AppState};
use spraylog_api::report::{ReportGenerator, ReportSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting SprayLog API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if spraylog_api::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        tracing::warn!("JWT_SECRET is empty; every protected request will be rejected");
    }

    let pool = DatabaseManager::pool().await?;
    let store = PgApplicationStore::new(pool);
    let generator = ReportGenerator::new(Arc::new(store), ReportSettings::from_config(&config.report));
    let app = handlers::router(AppState::new(generator, true));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("SprayLog API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
