//! Quillboard batch runner
//!
//! Runs the dormant-user sweep on a fixed cadence. Each run holds the
//! `batch:dormant-users` lock so only one replica sweeps at a time.

use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quillboard_api::adapters::{
    ensure_schema, InMemoryDistributedLock, InMemoryStore, PostgresLeaseLock,
    PostgresTransactionManager,
};
use quillboard_api::app::{UserBatchService, DORMANT_SWEEP_LOCK_KEY};
use quillboard_api::config::Config;
use quillboard_api::domain::ports::{DistributedLock, DistributedLockExt, TransactionManager};
use quillboard_api::error::LockError;
use quillboard_api::{event_publisher, notifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quillboard_api=debug,quillboard_batch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quillboard batch runner...");

    let config = Config::from_env().context("Failed to load configuration")?;

    match config.database_url.clone() {
        Some(url) => {
            let db = Database::connect(&url)
                .await
                .context("Failed to connect to database")?;
            ensure_schema(&db)
                .await
                .context("Failed to create database schema")?;

            let lock = PostgresLeaseLock::new(db.clone());
            run(Arc::new(PostgresTransactionManager::new(db)), lock, &config).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sweeping an empty in-memory store");
            let store = InMemoryStore::new();
            run(
                Arc::new(store.transaction_manager()),
                InMemoryDistributedLock::new(),
                &config,
            )
            .await
        }
    }
}

async fn run<TM, L>(transactions: Arc<TM>, lock: L, config: &Config) -> anyhow::Result<()>
where
    TM: TransactionManager,
    L: DistributedLock,
{
    let service = UserBatchService::new(transactions, event_publisher(config))
        .with_dormant_after(config.dormant_after())
        .with_notifications(notifier(config));

    let mut ticker = tokio::time::interval(config.sweep_interval);
    tracing::info!(
        interval_secs = config.sweep_interval.as_secs(),
        dormant_after_days = config.dormant_after_days,
        "Dormant-user sweep scheduled"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                return Ok(());
            }
        }

        let outcome = lock
            .execute_with_lock(
                DORMANT_SWEEP_LOCK_KEY,
                config.sweep_lock_wait,
                config.sweep_lock_lease,
                || service.process_dormant_users(),
            )
            .await;

        match outcome {
            Ok(Ok(marked)) => tracing::info!(marked, "Dormant-user sweep finished"),
            Ok(Err(e)) => tracing::error!(error = %e, "Dormant-user sweep failed"),
            Err(LockError::Acquisition { key }) => {
                tracing::info!(key = %key, "Sweep already running elsewhere, skipping")
            }
            Err(e) => tracing::error!(error = %e, "Lock backend error"),
        }
    }
}
