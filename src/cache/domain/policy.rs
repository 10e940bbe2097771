//! Freshness policy for stale-while-revalidate caching.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_PRIMARY_TTL_MS: u64 = 300_000;
const DEFAULT_REVALIDATION_LOCK_TTL_MS: u64 = 30_000;

/// TTL configuration for one cached resource.
///
/// The stale mirror never expires, so only the primary entry and the
/// revalidation marker carry a TTL. Missing fields fall back to the defaults
/// when deserialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Lifetime of the primary entry in milliseconds.
    pub primary_ttl_ms: u64,
    /// Lifetime of the revalidation marker in milliseconds.
    pub revalidation_lock_ttl_ms: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            primary_ttl_ms: DEFAULT_PRIMARY_TTL_MS,
            revalidation_lock_ttl_ms: DEFAULT_REVALIDATION_LOCK_TTL_MS,
        }
    }
}

impl CachePolicy {
    /// Sets the primary entry TTL.
    #[must_use]
    pub const fn with_primary_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.primary_ttl_ms = ttl_ms;
        self
    }

    /// Sets the revalidation marker TTL.
    #[must_use]
    pub const fn with_revalidation_lock_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.revalidation_lock_ttl_ms = ttl_ms;
        self
    }

    /// Primary TTL as a [`Duration`].
    #[must_use]
    pub const fn primary_ttl(&self) -> Duration {
        Duration::from_millis(self.primary_ttl_ms)
    }

    /// Revalidation marker TTL as a [`Duration`].
    #[must_use]
    pub const fn revalidation_lock_ttl(&self) -> Duration {
        Duration::from_millis(self.revalidation_lock_ttl_ms)
    }
}
