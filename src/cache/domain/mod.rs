//! Domain model for stale-while-revalidate caching.
//!
//! Covers cache resource naming, the registry snapshot value, freshness
//! policy, and the observable outcomes of background revalidation. No
//! infrastructure concerns cross this boundary.

mod error;
mod events;
mod policy;
mod resource;
mod snapshot;
mod state;

pub use error::CacheDomainError;
pub use events::{
    BOOTSTRAP_SCRIPT_RELOAD_EVENT, METADATA_CACHE_SYNC_EVENT, PACKAGE_CACHE_SYNC_EVENT,
    ROUTE_CACHE_SYNC_EVENT, RevalidationEvent,
};
pub use policy::CachePolicy;
pub use resource::CacheResource;
pub use snapshot::RegistrySnapshot;
pub use state::CacheState;
