//! Port contracts for the cache coherency layer.
//!
//! Ports define infrastructure-agnostic interfaces for the shared key-value
//! store and the authoritative snapshot source.

pub mod kv;
pub mod source;

pub use kv::{DistributedKv, KvError, KvResult, effective_ttl};
pub use source::{SnapshotSource, SnapshotSourceError, SnapshotSourceResult};
