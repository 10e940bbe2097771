//! Shared key-value store port with set-if-absent and compare-and-delete.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for key-value store operations.
pub type KvResult<T> = Result<T, KvError>;

/// Key-value store reachable by every service instance.
///
/// Expired entries must behave exactly like absent ones for every operation.
#[async_trait]
pub trait DistributedKv: Send + Sync {
    /// Stores `value` under `key` only if the key is absent or expired.
    ///
    /// Returns `true` when this caller won the key.
    async fn acquire(&self, key: &str, value: &str, ttl: Duration) -> KvResult<bool>;

    /// Stores `value` under `key` unconditionally.
    ///
    /// A `ttl` of `None` or zero means the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> KvResult<()>;

    /// Reads the live value stored under `key`.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Deletes `key` only if it currently holds `expected`.
    ///
    /// Returns `true` when the entry was removed.
    async fn release(&self, key: &str, expected: &str) -> KvResult<bool>;
}

/// Normalises a TTL so that zero means "no expiry".
#[must_use]
pub fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|duration| !duration.is_zero())
}

/// Errors returned by key-value store adapters.
#[derive(Debug, Clone, Error)]
pub enum KvError {
    /// The store could not be reached.
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),

    /// Store-side failure.
    #[error("key-value store error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl KvError {
    /// Wraps a store-side error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
