//! Table-backed lease lock
//!
//! A lease is a row in `distributed_locks`. Acquiring inserts the row, or
//! takes it over when the current lease has expired; releasing deletes it
//! only when this handle's holder id still owns it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::domain::ports::DistributedLock;
use crate::entity::distributed_locks;
use crate::error::LockError;

/// Pause between acquisition attempts while waiting
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct PostgresLeaseLock {
    db: DatabaseConnection,
    holder: String,
}

impl PostgresLeaseLock {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            holder: Uuid::new_v4().to_string(),
        }
    }

    async fn try_acquire(&self, key: &str, lease: Duration) -> Result<bool, LockError> {
        let now = Utc::now();
        let lease = chrono::Duration::from_std(lease)
            .map_err(|e| LockError::Backend(format!("invalid lease: {}", e)))?;

        let row = distributed_locks::ActiveModel {
            lock_key: Set(key.to_string()),
            holder: Set(self.holder.clone()),
            expires_at: Set((now + lease).fixed_offset()),
        };

        let inserted = distributed_locks::Entity::insert(row)
            .on_conflict(
                OnConflict::column(distributed_locks::Column::LockKey)
                    .update_columns([
                        distributed_locks::Column::Holder,
                        distributed_locks::Column::ExpiresAt,
                    ])
                    .action_and_where(
                        Expr::col((
                            distributed_locks::Entity,
                            distributed_locks::Column::ExpiresAt,
                        ))
                        .lt(now.fixed_offset()),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| LockError::Backend(e.to_string()))?;

        Ok(inserted == 1)
    }
}

#[async_trait]
impl DistributedLock for PostgresLeaseLock {
    async fn try_lock(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<bool, LockError> {
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            if self.try_acquire(key, lease).await? {
                return Ok(true);
            }
            if tokio::time::Instant::now() + POLL_INTERVAL > deadline {
                tracing::debug!(key = %key, "Lock wait elapsed");
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn unlock(&self, key: &str) -> Result<(), LockError> {
        distributed_locks::Entity::delete_many()
            .filter(distributed_locks::Column::LockKey.eq(key))
            .filter(distributed_locks::Column::Holder.eq(self.holder.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| LockError::Backend(e.to_string()))?;

        Ok(())
    }
}
