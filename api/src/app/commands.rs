//! Use-case input commands
//!
//! Every field is optional so a missing field in a request body surfaces as a
//! validation error naming that field instead of a deserialization failure.

use serde::Deserialize;

use crate::domain::entities::{CommentId, PostId, UserId};
use crate::error::AppError;

fn required<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation(field, "cannot be null"))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserCommand {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl CreateUserCommand {
    pub(crate) fn validate(self) -> Result<(String, String), AppError> {
        let username = required("username", self.username)?;
        let email = required("email", self.email)?;
        Ok((username, email))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserCommand {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserCommand {
    pub(crate) fn validate(self) -> Result<(UserId, String, String), AppError> {
        let id = required("id", self.id)?;
        let username = required("username", self.username)?;
        let email = required("email", self.email)?;
        Ok((UserId(id), username, email))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePostCommand {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author_id: Option<i64>,
}

pub(crate) struct NewPostInput {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
}

impl CreatePostCommand {
    pub(crate) fn validate(self) -> Result<NewPostInput, AppError> {
        Ok(NewPostInput {
            title: required("title", self.title)?,
            content: required("content", self.content)?,
            author_id: UserId(required("authorId", self.author_id)?),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePostCommand {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdatePostCommand {
    pub(crate) fn validate(self) -> Result<(PostId, String, String), AppError> {
        let id = required("id", self.id)?;
        let title = required("title", self.title)?;
        let content = required("content", self.content)?;
        Ok((PostId(id), title, content))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCommentCommand {
    pub content: Option<String>,
    pub post_id: Option<i64>,
    pub author_id: Option<i64>,
}

pub(crate) struct NewCommentInput {
    pub content: String,
    pub post_id: PostId,
    pub author_id: UserId,
}

impl CreateCommentCommand {
    pub(crate) fn validate(self) -> Result<NewCommentInput, AppError> {
        Ok(NewCommentInput {
            content: required("content", self.content)?,
            post_id: PostId(required("postId", self.post_id)?),
            author_id: UserId(required("authorId", self.author_id)?),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCommentCommand {
    pub id: Option<i64>,
    pub content: Option<String>,
}

impl UpdateCommentCommand {
    pub(crate) fn validate(self) -> Result<(CommentId, String), AppError> {
        let id = required("id", self.id)?;
        let content = required("content", self.content)?;
        Ok((CommentId(id), content))
    }
}
