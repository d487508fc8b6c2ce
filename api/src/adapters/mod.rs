//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod http;
pub mod memory;
pub mod postgres;

pub use http::{HttpEventPublisher, WebhookNotifier};
pub use memory::{
    InMemoryCache, InMemoryDistributedLock, InMemoryEventBus, InMemoryStore,
    InMemoryTransactionManager, LogNotifier,
};
pub use postgres::{ensure_schema, PostgresLeaseLock, PostgresTransactionManager};
