//! Test doubles for port traits
//!
//! The in-memory adapters cover the happy path. These wrap or replace them
//! to count calls and inject failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::adapters::memory::{
    InMemoryTransactionManager, InMemoryUnitOfWork, InMemoryUserRepository,
};
use crate::domain::entities::{User, UserId, UserStatus};
use crate::domain::ports::{
    CachePort, CommentRepository, NotificationPort, PostRepository, TransactionManager,
    TransactionMode, UnitOfWork, UserRepository,
};
use crate::error::{CacheError, DomainError, NotificationError};

// ============================================================================
// Spy Transaction Manager
// ============================================================================

/// Counts how many scopes were opened
pub struct SpyTransactionManager<TM> {
    inner: TM,
    begins: AtomicUsize,
}

impl<TM> SpyTransactionManager<TM> {
    pub fn new(inner: TM) -> Self {
        Self {
            inner,
            begins: AtomicUsize::new(0),
        }
    }

    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<TM: TransactionManager> TransactionManager for SpyTransactionManager<TM> {
    type Scope = TM::Scope;

    async fn begin(&self, mode: TransactionMode) -> Result<Self::Scope, DomainError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        self.inner.begin(mode).await
    }
}

// ============================================================================
// Failing Save Transaction Manager
// ============================================================================

/// Opens in-memory scopes whose user repository fails on the nth save
pub struct FailingSaveTransactionManager {
    inner: InMemoryTransactionManager,
    fail_on: usize,
}

impl FailingSaveTransactionManager {
    pub fn new(inner: InMemoryTransactionManager, fail_on: usize) -> Self {
        Self { inner, fail_on }
    }
}

#[async_trait]
impl TransactionManager for FailingSaveTransactionManager {
    type Scope = FailingSaveScope;

    async fn begin(&self, mode: TransactionMode) -> Result<Self::Scope, DomainError> {
        let inner = self.inner.begin(mode).await?;
        let users = FailingUserRepository {
            inner: inner.user_repository(),
            saves: AtomicUsize::new(0),
            fail_on: self.fail_on,
        };
        Ok(FailingSaveScope { inner, users })
    }
}

pub struct FailingSaveScope {
    inner: InMemoryUnitOfWork,
    users: FailingUserRepository,
}

#[async_trait]
impl UnitOfWork for FailingSaveScope {
    fn mode(&self) -> TransactionMode {
        self.inner.mode()
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn posts(&self) -> &dyn PostRepository {
        self.inner.posts()
    }

    fn comments(&self) -> &dyn CommentRepository {
        self.inner.comments()
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.inner.commit().await
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.inner.rollback().await
    }
}

pub struct FailingUserRepository {
    inner: InMemoryUserRepository,
    saves: AtomicUsize,
    fail_on: usize,
}

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn save(&self, user: &User) -> Result<User, DomainError> {
        let attempt = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == self.fail_on {
            return Err(DomainError::Database("connection reset".to_string()));
        }
        self.inner.save(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        self.inner.find_all().await
    }

    async fn delete_by_id(&self, id: &UserId) -> Result<(), DomainError> {
        self.inner.delete_by_id(id).await
    }

    async fn find_by_last_login_before_and_status(
        &self,
        threshold: DateTime<Utc>,
        status: UserStatus,
    ) -> Result<Vec<User>, DomainError> {
        self.inner
            .find_by_last_login_before_and_status(threshold, status)
            .await
    }
}

// ============================================================================
// Failing Cache
// ============================================================================

/// A cache whose backend is unreachable
pub struct FailingCache;

fn unreachable_backend() -> CacheError {
    CacheError::Backend("cache unreachable".to_string())
}

#[async_trait]
impl CachePort for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(unreachable_backend())
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Err(unreachable_backend())
    }

    async fn evict(&self, _key: &str) -> Result<(), CacheError> {
        Err(unreachable_backend())
    }

    async fn evict_by_pattern(&self, _pattern: &str) -> Result<(), CacheError> {
        Err(unreachable_backend())
    }

    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Err(unreachable_backend())
    }
}

/// A notifier whose webhook always refuses
pub struct FailingNotifier;

#[async_trait]
impl NotificationPort for FailingNotifier {
    async fn send_notification(&self, _message: &str) -> Result<(), NotificationError> {
        Err(NotificationError::Rejected { status: 500 })
    }
}
