//! Transaction boundary for use cases
//!
//! `with_transaction` opens a scope, runs the work against it and commits on
//! `Ok`. Any `Err` rolls the scope back and is returned unchanged; a failing
//! rollback is logged and never replaces the original error.

use std::future::Future;
use std::pin::Pin;

use crate::domain::ports::{TransactionManager, TransactionMode, UnitOfWork};
use crate::error::AppError;

/// Future returned by work run inside a scope
pub type ScopeFuture<'s, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 's>>;

pub async fn with_transaction<TM, T, F>(
    manager: &TM,
    mode: TransactionMode,
    work: F,
) -> Result<T, AppError>
where
    TM: TransactionManager + ?Sized,
    F: for<'s> FnOnce(&'s TM::Scope) -> ScopeFuture<'s, T> + Send,
    T: Send,
{
    let scope = manager.begin(mode).await?;

    match work(&scope).await {
        Ok(value) => {
            scope.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = scope.rollback().await {
                tracing::warn!(
                    error = %rollback_err,
                    cause = %err,
                    "Rollback failed after use case error"
                );
            }
            Err(err)
        }
    }
}
