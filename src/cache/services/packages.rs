//! Package registry cache.

use super::{CacheServiceResult, SwrCache};
use crate::cache::{
    domain::{CachePolicy, CacheResource, RegistrySnapshot},
    ports::{DistributedKv, SnapshotSource},
};
use std::sync::Arc;

/// Stale-while-revalidate cache of enabled backend packages.
///
/// Stored under `global:packages`, `stale:packages` and
/// `revalidating:packages`.
pub struct PackageCache<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    cache: SwrCache<K, S>,
}

impl<K, S> Clone for PackageCache<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<K, S> PackageCache<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    /// Creates the package cache with the default policy.
    #[must_use]
    pub fn new(kv: Arc<K>, source: Arc<S>) -> Self {
        Self::with_policy(kv, source, CachePolicy::default())
    }

    /// Creates the package cache with a custom policy.
    #[must_use]
    pub fn with_policy(kv: Arc<K>, source: Arc<S>, policy: CachePolicy) -> Self {
        Self {
            cache: SwrCache::new(kv, source, CacheResource::packages(), policy),
        }
    }

    /// Returns the enabled backend package names.
    ///
    /// # Errors
    ///
    /// Returns an error only when no cached copy exists and the synchronous
    /// load fails.
    pub async fn get_packages(&self) -> CacheServiceResult<RegistrySnapshot> {
        self.cache.get().await
    }

    /// Reloads the package list, logging rather than returning failures.
    pub async fn reload(&self) -> Option<RegistrySnapshot> {
        self.cache.reload().await
    }

    /// Returns the underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &SwrCache<K, S> {
        &self.cache
    }
}
