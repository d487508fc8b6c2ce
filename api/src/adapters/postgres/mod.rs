//! PostgreSQL adapters
//!
//! Implementations of the repository, transaction and lock ports using
//! SeaORM and PostgreSQL.

pub mod comment_repo;
pub mod lock;
pub mod post_repo;
pub mod schema;
pub mod transaction;
pub mod user_repo;


pub use comment_repo::PostgresCommentRepository;
pub use lock::PostgresLeaseLock;
pub use post_repo::PostgresPostRepository;
pub use schema::ensure_schema;
pub use transaction::{PostgresTransactionManager, PostgresUnitOfWork};
pub use user_repo::PostgresUserRepository;
