//! In-process lease lock
//!
//! Handles created with [`InMemoryDistributedLock::handle`] share one lease
//! table but have distinct holder identities, standing in for separate nodes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::ports::DistributedLock;
use crate::error::LockError;

#[derive(Debug, Clone, Copy)]
struct Lease {
    holder: Uuid,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct LeaseTable {
    leases: Mutex<HashMap<String, Lease>>,
    released: Notify,
}

#[derive(Debug, Clone)]
pub struct InMemoryDistributedLock {
    table: Arc<LeaseTable>,
    holder: Uuid,
}

impl Default for InMemoryDistributedLock {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDistributedLock {
    pub fn new() -> Self {
        Self {
            table: Arc::new(LeaseTable::default()),
            holder: Uuid::new_v4(),
        }
    }

    /// Another holder on the same lease table
    pub fn handle(&self) -> Self {
        Self {
            table: self.table.clone(),
            holder: Uuid::new_v4(),
        }
    }

    /// Whether any holder has an unexpired lease on `key`
    pub async fn is_locked(&self, key: &str) -> bool {
        let leases = self.table.leases.lock().await;
        leases
            .get(key)
            .is_some_and(|lease| lease.expires_at > Instant::now())
    }
}

#[async_trait]
impl DistributedLock for InMemoryDistributedLock {
    async fn try_lock(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<bool, LockError> {
        let deadline = Instant::now() + wait;

        loop {
            // Registered before the check so a release in between is not missed.
            let released = self.table.released.notified();

            let current_expiry = {
                let mut leases = self.table.leases.lock().await;
                let now = Instant::now();
                match leases.get(key) {
                    Some(current) if current.expires_at > now => current.expires_at,
                    _ => {
                        leases.insert(
                            key.to_string(),
                            Lease {
                                holder: self.holder,
                                expires_at: now + lease,
                            },
                        );
                        return Ok(true);
                    }
                }
            };

            if Instant::now() >= deadline {
                tracing::debug!(key = %key, "Lock wait elapsed");
                return Ok(false);
            }

            let wake_at = deadline.min(current_expiry);
            let _ = tokio::time::timeout_at(wake_at, released).await;
        }
    }

    async fn unlock(&self, key: &str) -> Result<(), LockError> {
        let mut leases = self.table.leases.lock().await;
        if leases
            .get(key)
            .is_some_and(|lease| lease.holder == self.holder)
        {
            leases.remove(key);
            drop(leases);
            self.table.released.notify_waiters();
        }
        Ok(())
    }
}
