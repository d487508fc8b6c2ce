//! Test fixtures
//!
//! Factory functions for stored entities with sensible defaults.

use chrono::{DateTime, Utc};

use crate::domain::entities::{Comment, CommentId, Post, PostId, User, UserId, UserStatus};

/// An active user that logged in just now
pub fn stored_user(id: i64, username: &str) -> User {
    stored_user_last_seen(id, username, Some(Utc::now()), UserStatus::Active)
}

pub fn stored_user_last_seen(
    id: i64,
    username: &str,
    last_login_at: Option<DateTime<Utc>>,
    status: UserStatus,
) -> User {
    let created_at = Utc::now();
    User::reconstitute(
        UserId(id),
        username.to_string(),
        format!("{}@example.com", username),
        status,
        last_login_at,
        created_at,
        Some(created_at),
    )
}

pub fn stored_post(id: i64, author_id: i64, title: &str) -> Post {
    let created_at = Utc::now();
    Post::reconstitute(
        PostId(id),
        title.to_string(),
        format!("Body of {}", title),
        UserId(author_id),
        created_at,
        Some(created_at),
    )
}

pub fn stored_comment(id: i64, post_id: i64, author_id: i64, content: &str) -> Comment {
    let created_at = Utc::now();
    Comment::reconstitute(
        CommentId(id),
        content.to_string(),
        PostId(post_id),
        UserId(author_id),
        created_at,
        Some(created_at),
    )
}
