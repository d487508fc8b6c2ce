//! Domain entities
//!
//! Self-validating domain models. These are separate from the SeaORM
//! entities in the `entity` module.

pub mod comment;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentId, COMMENT_MAX_CHARS};
pub use post::{Post, PostId, CONTENT_MAX_CHARS, TITLE_MAX_CHARS};
pub use user::{User, UserId, UserStatus, USERNAME_MAX_CHARS, USERNAME_MIN_CHARS};
