//! Shared world state for package cache scenarios.

use std::sync::Arc;

use enfyra_core::cache::{
    adapters::memory::{InMemoryKv, ManualClock, StaticSnapshotSource},
    domain::RegistrySnapshot,
    services::PackageCache,
};
use rstest::fixture;
use tokio::sync::Semaphore;

/// Key-value store type used by the BDD world.
pub type TestKv = InMemoryKv<ManualClock>;

/// Scenario world for package cache behaviour tests.
pub struct PackageCacheWorld {
    pub clock: ManualClock,
    pub kv: Arc<TestKv>,
    pub source: StaticSnapshotSource,
    pub cache: PackageCache<TestKv, StaticSnapshotSource>,
    pub gate: Option<Arc<Semaphore>>,
    pub reads: Vec<RegistrySnapshot>,
}

impl PackageCacheWorld {
    /// Creates a world with an empty registry and an empty store.
    #[must_use]
    pub fn new() -> Self {
        let clock = ManualClock::default();
        let kv = Arc::new(InMemoryKv::new(Arc::new(clock.clone())));
        let source = StaticSnapshotSource::default();
        let cache = PackageCache::new(Arc::clone(&kv), Arc::new(source.clone()));
        Self {
            clock,
            kv,
            source,
            cache,
            gate: None,
            reads: Vec::new(),
        }
    }
}

impl Default for PackageCacheWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PackageCacheWorld {
    PackageCacheWorld::default()
}

/// Parses a comma-separated package list.
pub fn packages(list: &str) -> RegistrySnapshot {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
