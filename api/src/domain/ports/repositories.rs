//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (PostgreSQL, in-memory) and are
//! always reached through a unit of work, so every call runs inside the
//! transaction scope the caller opened.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{Comment, CommentId, Post, PostId, User, UserId, UserStatus};
use crate::error::DomainError;

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user.
    ///
    /// On insert the adapter assigns the id and stamps `created_at`
    /// (with `updated_at` equal to it). The returned entity is the stored one.
    async fn save(&self, user: &User) -> Result<User, DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// All users, ordered by id
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Delete a user; deleting a missing id is not an error
    async fn delete_by_id(&self, id: &UserId) -> Result<(), DomainError>;

    /// Users whose last login is strictly before `threshold` and whose status matches.
    /// Users that never logged in are not returned.
    async fn find_by_last_login_before_and_status(
        &self,
        threshold: DateTime<Utc>,
        status: UserStatus,
    ) -> Result<Vec<User>, DomainError>;
}

/// Repository for Post entities
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn save(&self, post: &Post) -> Result<Post, DomainError>;

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError>;

    async fn find_all(&self) -> Result<Vec<Post>, DomainError>;

    /// Posts written by the given author, ordered by id
    async fn find_by_author(&self, author_id: &UserId) -> Result<Vec<Post>, DomainError>;

    async fn delete_by_id(&self, id: &PostId) -> Result<(), DomainError>;
}

/// Repository for Comment entities
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn save(&self, comment: &Comment) -> Result<Comment, DomainError>;

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, DomainError>;

    /// Comments on the given post, ordered by id
    async fn find_by_post(&self, post_id: &PostId) -> Result<Vec<Comment>, DomainError>;

    async fn delete_by_id(&self, id: &CommentId) -> Result<(), DomainError>;
}
