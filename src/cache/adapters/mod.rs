//! Adapter implementations for cache ports.

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryKv, ManualClock, StaticSnapshotSource};
