//! Quillboard API Server
//!
//! Serves users, posts and comments over HTTP. Storage is PostgreSQL when
//! `DATABASE_URL` is set, otherwise everything lives in memory.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quillboard_api::adapters::{ensure_schema, InMemoryCache, InMemoryStore, PostgresTransactionManager};
use quillboard_api::config::Config;
use quillboard_api::domain::ports::TransactionManager;
use quillboard_api::{event_publisher, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quillboard_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quillboard API...");

    let config = Config::from_env().context("Failed to load configuration")?;

    match config.database_url.clone() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(&url)
                .await
                .context("Failed to connect to database")?;
            ensure_schema(&db)
                .await
                .context("Failed to create database schema")?;
            tracing::info!("Database connected");

            serve(Arc::new(PostgresTransactionManager::new(db)), &config).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            let store = InMemoryStore::new();
            serve(Arc::new(store.transaction_manager()), &config).await
        }
    }
}

async fn serve<TM>(transactions: Arc<TM>, config: &Config) -> anyhow::Result<()>
where
    TM: TransactionManager + 'static,
{
    let state = AppState::new(
        transactions,
        Arc::new(InMemoryCache::new(config.cache_ttl)),
        event_publisher(config),
        config,
    );
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")
}
