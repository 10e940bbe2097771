//! Scriptable snapshot source for cache tests.

use crate::cache::{
    domain::RegistrySnapshot,
    ports::{SnapshotSource, SnapshotSourceError, SnapshotSourceResult},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Semaphore;

/// In-memory snapshot source that counts loads.
///
/// Contents can be replaced between loads, failures injected, and loads held
/// at a gate so tests can observe overlapping readers deterministically.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotSource {
    inner: Arc<SourceState>,
}

#[derive(Debug, Default)]
struct SourceState {
    snapshot: RwLock<RegistrySnapshot>,
    loads: AtomicUsize,
    failing: AtomicBool,
    gate: RwLock<Option<Arc<Semaphore>>>,
}

impl StaticSnapshotSource {
    /// Creates a source that returns `snapshot`.
    #[must_use]
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        let source = Self::default();
        source.replace(snapshot);
        source
    }

    /// Replaces the snapshot returned by subsequent loads.
    pub fn replace(&self, snapshot: RegistrySnapshot) {
        if let Ok(mut current) = self.inner.snapshot.write() {
            *current = snapshot;
        }
    }

    /// Makes subsequent loads fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Holds every subsequent load until a permit is added to the returned
    /// semaphore.
    #[must_use]
    pub fn hold_loads(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        if let Ok(mut slot) = self.inner.gate.write() {
            *slot = Some(Arc::clone(&gate));
        }
        gate
    }

    /// Returns how many loads have started.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.inner.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshotSource {
    async fn load(&self) -> SnapshotSourceResult<RegistrySnapshot> {
        self.inner.loads.fetch_add(1, Ordering::SeqCst);

        let gate = self
            .inner
            .gate
            .read()
            .map_err(|err| SnapshotSourceError::persistence(std::io::Error::other(err.to_string())))?
            .clone();
        if let Some(semaphore) = gate {
            let permit = semaphore
                .acquire()
                .await
                .map_err(SnapshotSourceError::persistence)?;
            permit.forget();
        }

        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(SnapshotSourceError::persistence(std::io::Error::other(
                "package store unreachable",
            )));
        }

        let snapshot = self
            .inner
            .snapshot
            .read()
            .map_err(|err| SnapshotSourceError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(snapshot.clone())
    }
}
