//! Event publisher port and the events the content service emits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{CommentId, PostId, UserId};
use crate::error::PublishError;

pub const USERS_TOPIC: &str = "users";
pub const POSTS_TOPIC: &str = "posts";
pub const COMMENTS_TOPIC: &str = "comments";

/// Events emitted after a use case commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentEvent {
    #[serde(rename_all = "camelCase")]
    UserRegistered {
        user_id: UserId,
        username: String,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    UserProfileUpdated {
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    UserWithdrawn {
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    UserDeleted {
        user_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    PostPublished {
        post_id: PostId,
        author_id: UserId,
        title: String,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    PostEdited {
        post_id: PostId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    PostDeleted {
        post_id: PostId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    CommentAdded {
        comment_id: CommentId,
        post_id: PostId,
        author_id: UserId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    CommentEdited {
        comment_id: CommentId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    CommentDeleted {
        comment_id: CommentId,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    DormantSweepCompleted {
        marked: usize,
        threshold: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },
}

impl ContentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ContentEvent::UserRegistered { .. } => "userRegistered",
            ContentEvent::UserProfileUpdated { .. } => "userProfileUpdated",
            ContentEvent::UserWithdrawn { .. } => "userWithdrawn",
            ContentEvent::UserDeleted { .. } => "userDeleted",
            ContentEvent::PostPublished { .. } => "postPublished",
            ContentEvent::PostEdited { .. } => "postEdited",
            ContentEvent::PostDeleted { .. } => "postDeleted",
            ContentEvent::CommentAdded { .. } => "commentAdded",
            ContentEvent::CommentEdited { .. } => "commentEdited",
            ContentEvent::CommentDeleted { .. } => "commentDeleted",
            ContentEvent::DormantSweepCompleted { .. } => "dormantSweepCompleted",
        }
    }
}

/// Publishes events to a broker, keyed for per-key ordering
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish and wait for the broker to acknowledge
    async fn publish(
        &self,
        topic: &str,
        key: Option<&str>,
        event: &ContentEvent,
    ) -> Result<(), PublishError>;

    /// Fire and forget. Failures are logged, never returned.
    fn publish_async(&self, topic: &str, key: Option<&str>, event: ContentEvent);
}
