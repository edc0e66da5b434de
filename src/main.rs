use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use storeflex_api::config;
use storeflex_api::database::DatabaseManager;
use storeflex_api::media::CloudinaryStore;
use storeflex_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storeflex_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Storeflex API in {:?} mode", config.environment);

    config.check_secrets().map_err(anyhow::Error::msg)?;

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
    }

    let media = CloudinaryStore::from_config(&config.media).context("failed to build media client")?;
    if !config.media.is_configured() {
        tracing::warn!("Media host credentials missing; upload endpoints will answer 503");
    }

    let app = app(AppState::new(pool, Arc::new(media)));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Storeflex API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
