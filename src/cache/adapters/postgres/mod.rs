//! `PostgreSQL` adapters for the shared cache store and package source.

mod kv;
mod models;
mod schema;
mod source;

pub use kv::{CachePgPool, PostgresKv};
pub use source::PostgresPackageSource;
