//! Adapter implementations for schema ports.

pub mod memory;
pub mod postgres;
pub mod sync;

pub use memory::InMemorySchemaStore;
pub use sync::{BroadcastSchemaSync, CacheReloadHook, RecordingSchemaSync, SyncMessage};
