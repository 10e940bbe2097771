//! Port contracts for schema mutation.
//!
//! Ports define infrastructure-agnostic interfaces for transactional
//! metadata and DDL access and for downstream change propagation.

pub mod store;
pub mod sync;

pub use store::{SchemaStore, SchemaStoreError, SchemaStoreResult, SchemaTransaction};
pub use sync::{SchemaSyncError, SchemaSyncHook, SchemaSyncResult, SyncFuture};

#[cfg(test)]
pub use sync::MockSchemaSyncHook;
