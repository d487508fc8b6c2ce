//! Distributed lock port
//!
//! Leases are owned by the handle that acquired them: `unlock` on a handle
//! that does not hold the lease is a no-op. A lease expires on its own after
//! the requested lease time, so a crashed holder cannot block others forever.
//! Locks are not reentrant.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;

use crate::error::LockError;

#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Wait up to `wait` for the lock on `key`; on success hold it for at most `lease`.
    /// Returns `false` when the wait elapsed without acquiring.
    async fn try_lock(&self, key: &str, wait: Duration, lease: Duration)
        -> Result<bool, LockError>;

    /// Release `key` if this handle holds it
    async fn unlock(&self, key: &str) -> Result<(), LockError>;
}

#[async_trait]
pub trait DistributedLockExt: DistributedLock {
    /// Run `task` while holding `key`.
    ///
    /// The lock is released on every exit path, including a panic in the task,
    /// which is resumed after release. Fails with `LockError::Acquisition` if
    /// the lock could not be taken within `wait`.
    async fn execute_with_lock<T, F, Fut>(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
        task: F,
    ) -> Result<T, LockError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        if !self.try_lock(key, wait, lease).await? {
            return Err(LockError::Acquisition {
                key: key.to_string(),
            });
        }
        tracing::debug!(key = %key, "Lock acquired");

        let outcome = AssertUnwindSafe(async move { task().await })
            .catch_unwind()
            .await;

        if let Err(e) = self.unlock(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to release lock");
        }

        match outcome {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

impl<L: DistributedLock + ?Sized> DistributedLockExt for L {}
