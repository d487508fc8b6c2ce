//! Cache port
//!
//! String-valued key/value cache with per-entry expiry. Typed access goes
//! through [`CacheExt`], which stores values as JSON.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CacheError;

/// Expiry applied when `put` is called without a ttl
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

#[async_trait]
pub trait CachePort: Send + Sync {
    /// Value stored under `key`, or `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value. `None` ttl means the adapter's default expiry.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn evict(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key matching a glob pattern (`*` and `?` wildcards)
    async fn evict_by_pattern(&self, pattern: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}

/// JSON helpers available on every cache
#[async_trait]
pub trait CacheExt: CachePort {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put_json<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let raw = serde_json::to_string(value)?;
        self.put(key, raw, ttl).await
    }
}

impl<C: CachePort + ?Sized> CacheExt for C {}

/// Translate a glob pattern into an anchored regex
pub fn glob_to_regex(pattern: &str) -> Result<Regex, CacheError> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| CacheError::Pattern(e.to_string()))
}
