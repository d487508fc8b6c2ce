//! In-memory adapters
//!
//! Used when no database or broker is configured, and as test doubles.

mod cache;
mod events;
mod lock;
mod notifications;
mod store;

pub use cache::InMemoryCache;
pub use events::{InMemoryEventBus, PublishedEvent};
pub use lock::InMemoryDistributedLock;
pub use notifications::LogNotifier;
pub use store::{
    InMemoryCommentRepository, InMemoryPostRepository, InMemoryStore,
    InMemoryTransactionManager, InMemoryUnitOfWork, InMemoryUserRepository,
};
