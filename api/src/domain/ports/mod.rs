//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod cache;
pub mod events;
pub mod lock;
pub mod notification;
pub mod repositories;
pub mod transaction;

pub use cache::{glob_to_regex, CacheExt, CachePort, DEFAULT_CACHE_TTL};
pub use events::{ContentEvent, EventPublisher, COMMENTS_TOPIC, POSTS_TOPIC, USERS_TOPIC};
pub use lock::{DistributedLock, DistributedLockExt};
pub use notification::NotificationPort;
pub use repositories::{CommentRepository, PostRepository, UserRepository};
pub use transaction::{TransactionManager, TransactionMode, UnitOfWork};
