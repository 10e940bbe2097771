//! Hook that records events, with failure injection.

use crate::schema::{
    domain::SchemaChangeEvent,
    ports::{SchemaSyncError, SchemaSyncHook, SchemaSyncResult, SyncFuture},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Records every accepted event in dispatch order.
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct RecordingSchemaSync {
    events: Arc<Mutex<Vec<SchemaChangeEvent>>>,
    fail_dispatch: Arc<AtomicBool>,
    fail_delivery: Arc<AtomicBool>,
    settled: Arc<watch::Sender<usize>>,
}

impl Default for RecordingSchemaSync {
    fn default() -> Self {
        Self {
            events: Arc::default(),
            fail_dispatch: Arc::default(),
            fail_delivery: Arc::default(),
            settled: Arc::new(watch::Sender::new(0)),
        }
    }
}

impl RecordingSchemaSync {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `dispatch` itself fail.
    pub fn fail_dispatch(&self, failing: bool) {
        self.fail_dispatch.store(failing, Ordering::SeqCst);
    }

    /// Makes the returned futures fail.
    pub fn fail_delivery(&self, failing: bool) {
        self.fail_delivery.store(failing, Ordering::SeqCst);
    }

    /// Returns the accepted events.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaSyncError::Unavailable`] when lock acquisition fails.
    pub fn events(&self) -> SchemaSyncResult<Vec<SchemaChangeEvent>> {
        self.events
            .lock()
            .map(|events| events.clone())
            .map_err(|err| SchemaSyncError::Unavailable(err.to_string()))
    }

    /// Waits until `count` returned futures have run to completion.
    pub async fn wait_for_settled(&self, count: usize) {
        let mut receiver = self.settled.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        drop(receiver.wait_for(|settled| *settled >= count).await);
    }
}

impl SchemaSyncHook for RecordingSchemaSync {
    fn dispatch(&self, event: SchemaChangeEvent) -> SchemaSyncResult<SyncFuture> {
        if self.fail_dispatch.load(Ordering::SeqCst) {
            return Err(SchemaSyncError::Unavailable("recorder rejecting".to_owned()));
        }
        self.events
            .lock()
            .map_err(|err| SchemaSyncError::Unavailable(err.to_string()))?
            .push(event);
        let failing = self.fail_delivery.load(Ordering::SeqCst);
        let settled = Arc::clone(&self.settled);
        Ok(Box::pin(async move {
            settled.send_modify(|count| *count = count.saturating_add(1));
            if failing {
                return Err(SchemaSyncError::Unavailable("delivery failed".to_owned()));
            }
            Ok(())
        }))
    }
}
