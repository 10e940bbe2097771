//! Reloads the package cache whenever the schema changes.

use crate::cache::{
    ports::{DistributedKv, SnapshotSource},
    services::PackageCache,
};
use crate::schema::{
    domain::SchemaChangeEvent,
    ports::{SchemaSyncError, SchemaSyncHook, SchemaSyncResult, SyncFuture},
};
use tracing::debug;

/// Hook bridging structural changes to a package cache reload.
pub struct CacheReloadHook<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    cache: PackageCache<K, S>,
}

impl<K, S> CacheReloadHook<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    /// Creates a hook reloading `cache`.
    #[must_use]
    pub const fn new(cache: PackageCache<K, S>) -> Self {
        Self { cache }
    }
}

impl<K, S> SchemaSyncHook for CacheReloadHook<K, S>
where
    K: DistributedKv + 'static,
    S: SnapshotSource + 'static,
{
    fn dispatch(&self, event: SchemaChangeEvent) -> SchemaSyncResult<SyncFuture> {
        let cache = self.cache.clone();
        Ok(Box::pin(async move {
            debug!(
                table = %event.entity_name,
                kind = %event.kind,
                "reloading package cache"
            );
            cache.reload().await.map(|_| ()).ok_or_else(|| {
                SchemaSyncError::Unavailable(format!(
                    "package cache reload after change to {} failed",
                    event.entity_name
                ))
            })
        }))
    }
}
