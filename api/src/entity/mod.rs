//! SeaORM entities
//!
//! Table mappings used by the PostgreSQL adapters. Domain entities live in
//! `domain::entities`; the adapters convert between the two.

pub mod comments;
pub mod distributed_locks;
pub mod posts;
pub mod users;
