//! Comment domain entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::post::PostId;
use super::user::UserId;
use crate::error::DomainError;

pub const COMMENT_MAX_CHARS: usize = 1_000;

/// Storage-assigned identifier for a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommentId(pub i64);

impl From<i64> for CommentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A comment left on a post
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    id: Option<CommentId>,
    content: String,
    post_id: PostId,
    author_id: UserId,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(
        content: &str,
        post_id: Option<PostId>,
        author_id: Option<UserId>,
    ) -> Result<Self, DomainError> {
        validate_content(content)?;
        let post_id =
            post_id.ok_or_else(|| DomainError::invalid("postId", "Post ID cannot be null"))?;
        let author_id =
            author_id.ok_or_else(|| DomainError::invalid("authorId", "Author ID cannot be null"))?;

        Ok(Self {
            id: None,
            content: content.to_string(),
            post_id,
            author_id,
            created_at: None,
            updated_at: None,
        })
    }

    pub fn reconstitute(
        id: CommentId,
        content: String,
        post_id: PostId,
        author_id: UserId,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            content,
            post_id,
            author_id,
            created_at: Some(created_at),
            updated_at,
        }
    }

    pub fn id(&self) -> Option<CommentId> {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn update_content(&mut self, content: &str) -> Result<(), DomainError> {
        validate_content(content)?;
        self.content = content.to_string();
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn can_be_modified_by(&self, user_id: Option<UserId>) -> bool {
        user_id == Some(self.author_id)
    }

    /// Created within the last hour
    pub fn is_recently_created(&self) -> bool {
        self.created_at
            .is_some_and(|at| at > Utc::now() - Duration::hours(1))
    }
}

fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::invalid(
            "content",
            "Comment content cannot be empty",
        ));
    }
    if content.chars().count() > COMMENT_MAX_CHARS {
        return Err(DomainError::invalid(
            "content",
            format!("Comment content cannot exceed {} characters", COMMENT_MAX_CHARS),
        ));
    }
    Ok(())
}
