//! Post domain entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;
use crate::error::DomainError;

pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_MAX_CHARS: usize = 10_000;

/// Storage-assigned identifier for a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(pub i64);

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A post written by a user
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    id: Option<PostId>,
    title: String,
    content: String,
    author_id: UserId,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new, not yet persisted post
    pub fn new(title: &str, content: &str, author_id: Option<UserId>) -> Result<Self, DomainError> {
        validate_title(title)?;
        validate_content(content)?;
        let author_id =
            author_id.ok_or_else(|| DomainError::invalid("authorId", "Author ID cannot be null"))?;

        Ok(Self {
            id: None,
            title: title.to_string(),
            content: content.to_string(),
            author_id,
            created_at: None,
            updated_at: None,
        })
    }

    /// Rebuild a post from storage without validation
    pub fn reconstitute(
        id: PostId,
        title: String,
        content: String,
        author_id: UserId,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            title,
            content,
            author_id,
            created_at: Some(created_at),
            updated_at,
        }
    }

    pub fn id(&self) -> Option<PostId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
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

    /// Replace title and content; nothing changes unless both are valid
    pub fn update_content(&mut self, title: &str, content: &str) -> Result<(), DomainError> {
        validate_title(title)?;
        validate_content(content)?;

        self.title = title.to_string();
        self.content = content.to_string();
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn can_be_edited_by(&self, user_id: Option<UserId>) -> bool {
        user_id == Some(self.author_id)
    }

    /// Created within the last 24 hours
    pub fn is_recently_created(&self) -> bool {
        self.created_at
            .is_some_and(|at| at > Utc::now() - Duration::days(1))
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::invalid("title", "Post title cannot be empty"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::invalid(
            "title",
            format!("Post title cannot exceed {} characters", TITLE_MAX_CHARS),
        ));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::invalid("content", "Post content cannot be empty"));
    }
    if content.chars().count() > CONTENT_MAX_CHARS {
        return Err(DomainError::invalid(
            "content",
            format!("Post content cannot exceed {} characters", CONTENT_MAX_CHARS),
        ));
    }
    Ok(())
}
