//! In-memory schema store for tests and local tooling.

mod store;

pub use store::InMemorySchemaStore;
