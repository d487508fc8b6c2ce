//! Use-case constants
//!
//! Defaults shared by the services and the binaries that configure them.

use crate::domain::entities::PostId;

/// Users whose last login is older than this many days are marked dormant
pub const DORMANT_AFTER_DAYS: i64 = 365;

/// Lock key guarding the dormant-user sweep across processes
pub const DORMANT_SWEEP_LOCK_KEY: &str = "batch:dormant-users";

/// Prefix of cached post entries
pub const POST_CACHE_PREFIX: &str = "post:";

/// Cache key of a single post
pub fn post_cache_key(id: PostId) -> String {
    format!("{}{}", POST_CACHE_PREFIX, id)
}
