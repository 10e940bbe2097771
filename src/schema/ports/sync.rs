//! Change propagation hook port.

use crate::schema::domain::SchemaChangeEvent;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Result type for change propagation.
pub type SchemaSyncResult<T> = Result<T, SchemaSyncError>;

/// Pending downstream synchronisation started by a hook.
pub type SyncFuture = Pin<Box<dyn Future<Output = SchemaSyncResult<()>> + Send + 'static>>;

/// Consumer notified after every successful structural change.
///
/// `dispatch` returning `Err` means the hook could not be invoked at all.
/// The returned future performs the downstream work; the mutation engine
/// runs it detached and only logs its failure.
#[cfg_attr(test, mockall::automock)]
pub trait SchemaSyncHook: Send + Sync {
    /// Starts propagation of `event`.
    fn dispatch(&self, event: SchemaChangeEvent) -> SchemaSyncResult<SyncFuture>;
}

/// Errors returned by change propagation hooks.
#[derive(Debug, Clone, Error)]
pub enum SchemaSyncError {
    /// The hook is not accepting events.
    #[error("schema sync unavailable: {0}")]
    Unavailable(String),

    /// Downstream synchronisation failed.
    #[error("schema sync failed: {0}")]
    Downstream(Arc<dyn std::error::Error + Send + Sync>),
}

impl SchemaSyncError {
    /// Wraps a downstream failure.
    pub fn downstream(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Downstream(Arc::new(err))
    }
}
