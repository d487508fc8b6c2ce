//! Transaction boundary port
//!
//! A `TransactionManager` opens a `UnitOfWork`. Every repository call made
//! through the unit of work observes the scope's own writes and nothing is
//! visible outside until `commit`. Dropping or rolling back discards all writes.

use async_trait::async_trait;

use super::repositories::{CommentRepository, PostRepository, UserRepository};
use crate::error::DomainError;

/// Access mode requested for a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    ReadWrite,
    /// Hint that the scope performs no writes. Adapters may reject writes.
    ReadOnly,
}

impl TransactionMode {
    pub fn is_read_only(&self) -> bool {
        matches!(self, TransactionMode::ReadOnly)
    }
}

/// An open transaction scope
#[async_trait]
pub trait UnitOfWork: Send + Sync + Sized {
    fn mode(&self) -> TransactionMode;

    fn users(&self) -> &dyn UserRepository;

    fn posts(&self) -> &dyn PostRepository;

    fn comments(&self) -> &dyn CommentRepository;

    /// Make every write of this scope visible atomically
    async fn commit(self) -> Result<(), DomainError>;

    /// Discard every write of this scope
    async fn rollback(self) -> Result<(), DomainError>;
}

/// Opens transaction scopes against a store
#[async_trait]
pub trait TransactionManager: Send + Sync {
    type Scope: UnitOfWork;

    async fn begin(&self, mode: TransactionMode) -> Result<Self::Scope, DomainError>;
}
