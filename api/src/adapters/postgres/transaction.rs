//! PostgreSQL transaction manager
//!
//! Every unit of work wraps one database transaction shared by its three
//! repositories. Read-only scopes begin the transaction with
//! `AccessMode::ReadOnly`, so a stray write is rejected by the server.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::comment_repo::PostgresCommentRepository;
use super::post_repo::PostgresPostRepository;
use super::user_repo::PostgresUserRepository;
use crate::domain::ports::{
    CommentRepository, PostRepository, TransactionManager, TransactionMode, UnitOfWork,
    UserRepository,
};
use crate::error::DomainError;

pub struct PostgresTransactionManager {
    db: DatabaseConnection,
}

impl PostgresTransactionManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionManager for PostgresTransactionManager {
    type Scope = PostgresUnitOfWork;

    async fn begin(&self, mode: TransactionMode) -> Result<Self::Scope, DomainError> {
        let access_mode = match mode {
            TransactionMode::ReadWrite => AccessMode::ReadWrite,
            TransactionMode::ReadOnly => AccessMode::ReadOnly,
        };

        let txn = self
            .db
            .begin_with_config(None, Some(access_mode))
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let txn = Arc::new(txn);

        Ok(PostgresUnitOfWork {
            mode,
            users: PostgresUserRepository::new(txn.clone()),
            posts: PostgresPostRepository::new(txn.clone()),
            comments: PostgresCommentRepository::new(txn.clone()),
            txn,
        })
    }
}

pub struct PostgresUnitOfWork {
    mode: TransactionMode,
    txn: Arc<DatabaseTransaction>,
    users: PostgresUserRepository,
    posts: PostgresPostRepository,
    comments: PostgresCommentRepository,
}

impl PostgresUnitOfWork {
    /// Drop the repositories and take sole ownership of the transaction
    fn into_transaction(self) -> Result<DatabaseTransaction, DomainError> {
        let PostgresUnitOfWork {
            txn,
            users,
            posts,
            comments,
            ..
        } = self;
        drop((users, posts, comments));

        Arc::try_unwrap(txn).map_err(|_| {
            DomainError::Internal("transaction is still referenced by a repository".to_string())
        })
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn mode(&self) -> TransactionMode {
        self.mode
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn posts(&self) -> &dyn PostRepository {
        &self.posts
    }

    fn comments(&self) -> &dyn CommentRepository {
        &self.comments
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.into_transaction()?
            .commit()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.into_transaction()?
            .rollback()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}
