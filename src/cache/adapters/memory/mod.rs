//! In-memory adapters for deterministic cache tests and single-process use.

mod clock;
mod kv;
mod source;

pub use clock::ManualClock;
pub use kv::InMemoryKv;
pub use source::StaticSnapshotSource;
