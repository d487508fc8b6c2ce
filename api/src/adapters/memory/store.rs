//! In-memory store with transactional units of work
//!
//! Each unit of work takes a snapshot of the committed tables and records its
//! writes in a journal. Reads see the snapshot plus the scope's own writes.
//! Commit replays the journal onto the committed tables under one write lock;
//! rollback (or drop) discards it. Concurrent scopes updating the same row
//! resolve last-write-wins.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Comment, CommentId, Post, PostId, User, UserId, UserStatus};
use crate::domain::ports::{
    CommentRepository, PostRepository, TransactionManager, TransactionMode, UnitOfWork,
    UserRepository,
};
use crate::error::DomainError;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
}

#[derive(Debug, Clone)]
enum Change {
    SaveUser(User),
    DeleteUser(UserId),
    SavePost(Post),
    DeletePost(PostId),
    SaveComment(Comment),
    DeleteComment(CommentId),
}

impl Tables {
    fn apply(&mut self, change: Change) {
        match change {
            Change::SaveUser(user) => {
                if let Some(id) = user.id() {
                    self.users.insert(id, user);
                }
            }
            Change::DeleteUser(id) => {
                self.users.remove(&id);
            }
            Change::SavePost(post) => {
                if let Some(id) = post.id() {
                    self.posts.insert(id, post);
                }
            }
            Change::DeletePost(id) => {
                self.posts.remove(&id);
            }
            Change::SaveComment(comment) => {
                if let Some(id) = comment.id() {
                    self.comments.insert(id, comment);
                }
            }
            Change::DeleteComment(id) => {
                self.comments.remove(&id);
            }
        }
    }
}

/// Id sequences shared by every scope. Ids consumed by a rolled back scope are not reused.
#[derive(Debug, Default)]
struct Sequences {
    users: AtomicI64,
    posts: AtomicI64,
    comments: AtomicI64,
}

fn next_id(sequence: &AtomicI64) -> i64 {
    sequence.fetch_add(1, Ordering::SeqCst) + 1
}

/// Committed state shared by all transaction managers created from it
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    committed: Arc<RwLock<Tables>>,
    sequences: Arc<Sequences>,
    repository_calls: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction_manager(&self) -> InMemoryTransactionManager {
        InMemoryTransactionManager {
            store: self.clone(),
        }
    }

    /// Number of repository calls made through any scope of this store
    pub fn repository_calls(&self) -> usize {
        self.repository_calls.load(Ordering::SeqCst)
    }

    /// Pre-populate with a stored user
    pub fn with_user(self, user: User) -> Self {
        if let Some(id) = user.id() {
            self.sequences.users.fetch_max(id.0, Ordering::SeqCst);
            self.write_committed().users.insert(id, user);
        }
        self
    }

    /// Pre-populate with a stored post
    pub fn with_post(self, post: Post) -> Self {
        if let Some(id) = post.id() {
            self.sequences.posts.fetch_max(id.0, Ordering::SeqCst);
            self.write_committed().posts.insert(id, post);
        }
        self
    }

    /// Pre-populate with a stored comment
    pub fn with_comment(self, comment: Comment) -> Self {
        if let Some(id) = comment.id() {
            self.sequences.comments.fetch_max(id.0, Ordering::SeqCst);
            self.write_committed().comments.insert(id, comment);
        }
        self
    }

    fn snapshot(&self) -> Tables {
        self.committed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write_committed(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.committed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryTransactionManager {
    store: InMemoryStore,
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    type Scope = InMemoryUnitOfWork;

    async fn begin(&self, mode: TransactionMode) -> Result<Self::Scope, DomainError> {
        let state = Arc::new(ScopeState {
            mode,
            working: Mutex::new(Working {
                tables: self.store.snapshot(),
                journal: Vec::new(),
            }),
            sequences: self.store.sequences.clone(),
            calls: self.store.repository_calls.clone(),
        });

        Ok(InMemoryUnitOfWork {
            store: self.store.clone(),
            users: InMemoryUserRepository {
                state: state.clone(),
            },
            posts: InMemoryPostRepository {
                state: state.clone(),
            },
            comments: InMemoryCommentRepository {
                state: state.clone(),
            },
            state,
        })
    }
}

#[derive(Debug)]
struct Working {
    tables: Tables,
    journal: Vec<Change>,
}

#[derive(Debug)]
struct ScopeState {
    mode: TransactionMode,
    working: Mutex<Working>,
    sequences: Arc<Sequences>,
    calls: Arc<AtomicUsize>,
}

impl ScopeState {
    fn working(&self) -> MutexGuard<'_, Working> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.working.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, change: Change) -> Result<(), DomainError> {
        if self.mode.is_read_only() {
            return Err(DomainError::Internal(
                "write attempted in a read-only transaction".to_string(),
            ));
        }
        let mut working = self.working();
        working.tables.apply(change.clone());
        working.journal.push(change);
        Ok(())
    }
}

/// An open in-memory transaction scope
#[derive(Debug)]
pub struct InMemoryUnitOfWork {
    store: InMemoryStore,
    state: Arc<ScopeState>,
    users: InMemoryUserRepository,
    posts: InMemoryPostRepository,
    comments: InMemoryCommentRepository,
}

impl InMemoryUnitOfWork {
    /// Owned handle on this scope's user repository
    pub fn user_repository(&self) -> InMemoryUserRepository {
        self.users.clone()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn mode(&self) -> TransactionMode {
        self.state.mode
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
        let journal = {
            let mut working = self
                .state
                .working
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut working.journal)
        };

        if journal.is_empty() {
            return Ok(());
        }

        let mut committed = self.store.write_committed();
        for change in journal {
            committed.apply(change);
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    state: Arc<ScopeState>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<User, DomainError> {
        let stored = match user.id() {
            Some(_) => user.clone(),
            None => {
                let now = Utc::now();
                User::reconstitute(
                    UserId(next_id(&self.state.sequences.users)),
                    user.username().to_string(),
                    user.email().to_string(),
                    user.status(),
                    user.last_login_at(),
                    now,
                    Some(now),
                )
            }
        };
        self.state.record(Change::SaveUser(stored.clone()))?;
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.state.working().tables.users.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.state.working().tables.users.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: &UserId) -> Result<(), DomainError> {
        self.state.record(Change::DeleteUser(*id))
    }

    async fn find_by_last_login_before_and_status(
        &self,
        threshold: DateTime<Utc>,
        status: UserStatus,
    ) -> Result<Vec<User>, DomainError> {
        Ok(self
            .state
            .working()
            .tables
            .users
            .values()
            .filter(|u| u.status() == status && u.last_login_at().is_some_and(|at| at < threshold))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryPostRepository {
    state: Arc<ScopeState>,
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn save(&self, post: &Post) -> Result<Post, DomainError> {
        let stored = match post.id() {
            Some(_) => post.clone(),
            None => {
                let now = Utc::now();
                Post::reconstitute(
                    PostId(next_id(&self.state.sequences.posts)),
                    post.title().to_string(),
                    post.content().to_string(),
                    post.author_id(),
                    now,
                    Some(now),
                )
            }
        };
        self.state.record(Change::SavePost(stored.clone()))?;
        Ok(stored)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        Ok(self.state.working().tables.posts.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.state.working().tables.posts.values().cloned().collect())
    }

    async fn find_by_author(&self, author_id: &UserId) -> Result<Vec<Post>, DomainError> {
        Ok(self
            .state
            .working()
            .tables
            .posts
            .values()
            .filter(|p| p.author_id() == *author_id)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &PostId) -> Result<(), DomainError> {
        self.state.record(Change::DeletePost(*id))
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryCommentRepository {
    state: Arc<ScopeState>,
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn save(&self, comment: &Comment) -> Result<Comment, DomainError> {
        let stored = match comment.id() {
            Some(_) => comment.clone(),
            None => {
                let now = Utc::now();
                Comment::reconstitute(
                    CommentId(next_id(&self.state.sequences.comments)),
                    comment.content().to_string(),
                    comment.post_id(),
                    comment.author_id(),
                    now,
                    Some(now),
                )
            }
        };
        self.state.record(Change::SaveComment(stored.clone()))?;
        Ok(stored)
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, DomainError> {
        Ok(self.state.working().tables.comments.get(id).cloned())
    }

    async fn find_by_post(&self, post_id: &PostId) -> Result<Vec<Comment>, DomainError> {
        Ok(self
            .state
            .working()
            .tables
            .comments
            .values()
            .filter(|c| c.post_id() == *post_id)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &CommentId) -> Result<(), DomainError> {
        self.state.record(Change::DeleteComment(*id))
    }
}
