//! Revalidation outcomes and cross-instance sync identifiers.

use super::CacheResource;

/// Sync identifier asking instances to reload the package cache.
pub const PACKAGE_CACHE_SYNC_EVENT: &str = "enfyra:package-cache-sync";
/// Sync identifier asking instances to reload table metadata.
pub const METADATA_CACHE_SYNC_EVENT: &str = "enfyra:metadata-cache-sync";
/// Sync identifier asking instances to rebuild route tables.
pub const ROUTE_CACHE_SYNC_EVENT: &str = "enfyra:route-cache-sync";
/// Sync identifier asking instances to rerun bootstrap scripts.
pub const BOOTSTRAP_SCRIPT_RELOAD_EVENT: &str = "enfyra:bootstrap-script-reload";

/// Outcome of one detached background revalidation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationEvent {
    /// Another reviver held the marker, so nothing was loaded.
    SkippedLockHeld {
        /// Resource whose refresh was skipped.
        resource: CacheResource,
    },
    /// The reload succeeded and the marker was released.
    Completed {
        /// Resource that was refreshed.
        resource: CacheResource,
        /// Number of entries in the new snapshot.
        entries: usize,
    },
    /// The reload failed; the marker was still released.
    Failed {
        /// Resource whose refresh failed.
        resource: CacheResource,
        /// Failure description.
        reason: String,
    },
}

impl RevalidationEvent {
    /// Returns the resource the event refers to.
    #[must_use]
    pub const fn resource(&self) -> &CacheResource {
        match self {
            Self::SkippedLockHeld { resource }
            | Self::Completed { resource, .. }
            | Self::Failed { resource, .. } => resource,
        }
    }
}
