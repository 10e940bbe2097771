//! Authoritative snapshot source port.

use crate::cache::domain::RegistrySnapshot;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for snapshot source reads.
pub type SnapshotSourceResult<T> = Result<T, SnapshotSourceError>;

/// Read-only access to the persistent store backing a cached resource.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Loads the current authoritative snapshot.
    async fn load(&self) -> SnapshotSourceResult<RegistrySnapshot>;
}

/// Errors returned by snapshot source adapters.
#[derive(Debug, Clone, Error)]
pub enum SnapshotSourceError {
    /// Persistence-layer failure.
    #[error("snapshot source error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SnapshotSourceError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
