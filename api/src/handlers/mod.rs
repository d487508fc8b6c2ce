//! HTTP handlers
//!
//! Axum request handlers for the API endpoints. Handlers are generic over the
//! transaction manager so one router serves both storage backends.

pub mod comments;
pub mod health;
pub mod posts;
pub mod users;

pub use comments::{create_comment, delete_comment, get_comment, update_comment};
pub use health::health;
pub use posts::{create_post, delete_post, get_post, list_comments_by_post, list_posts, update_post};
pub use users::{
    create_user, delete_user, get_user, list_posts_by_author, list_users, record_login,
    update_user, withdraw_user,
};
