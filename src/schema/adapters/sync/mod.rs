//! Change propagation hook adapters.

mod broadcast;
mod cache_reload;
mod recording;

pub use broadcast::{BroadcastSchemaSync, SyncMessage};
pub use cache_reload::CacheReloadHook;
pub use recording::RecordingSchemaSync;
