//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services validate commands, run domain work inside a transaction scope
//! and emit events once the scope has committed.

pub mod comment_service;
pub mod commands;
pub mod dto;
pub mod post_service;
pub mod service_config;
pub mod transaction;
pub mod user_batch_service;
pub mod user_service;

pub use comment_service::CommentService;
pub use commands::{
    CreateCommentCommand, CreatePostCommand, CreateUserCommand, UpdateCommentCommand,
    UpdatePostCommand, UpdateUserCommand,
};
pub use dto::{CommentDto, PostDto, UserDto};
pub use post_service::PostService;
// Re-export constants for the binaries
#[allow(unused_imports)]
pub use service_config::*;
pub use transaction::{with_transaction, ScopeFuture};
pub use user_batch_service::UserBatchService;
pub use user_service::UserService;
