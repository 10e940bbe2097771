//! Publishes change events on an in-process broadcast bus.

use crate::cache::domain::{METADATA_CACHE_SYNC_EVENT, ROUTE_CACHE_SYNC_EVENT};
use crate::schema::{
    domain::SchemaChangeEvent,
    ports::{SchemaSyncError, SchemaSyncHook, SchemaSyncResult, SyncFuture},
};
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 64;

/// A change event addressed to one sync channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMessage {
    /// Sync event identifier, such as `enfyra:metadata-cache-sync`.
    pub channel: &'static str,
    /// The structural change.
    pub event: SchemaChangeEvent,
}

/// Hook that fans each change out to the metadata and route sync channels.
#[derive(Debug, Clone)]
pub struct BroadcastSchemaSync {
    sender: broadcast::Sender<SyncMessage>,
}

impl Default for BroadcastSchemaSync {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastSchemaSync {
    /// Creates a bus buffering up to `capacity` messages per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to published sync messages.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncMessage> {
        self.sender.subscribe()
    }
}

impl SchemaSyncHook for BroadcastSchemaSync {
    fn dispatch(&self, event: SchemaChangeEvent) -> SchemaSyncResult<SyncFuture> {
        let sender = self.sender.clone();
        Ok(Box::pin(async move {
            for channel in [METADATA_CACHE_SYNC_EVENT, ROUTE_CACHE_SYNC_EVENT] {
                let message = SyncMessage {
                    channel,
                    event: event.clone(),
                };
                sender.send(message).map_err(|_| {
                    SchemaSyncError::Unavailable(format!("no subscribers on {channel}"))
                })?;
                debug!(
                    channel,
                    table = %event.entity_name,
                    kind = %event.kind,
                    "published schema change"
                );
            }
            Ok(())
        }))
    }
}
