//! `PostgreSQL` adapter for schema metadata and DDL.

mod ddl;
mod models;
mod schema;
mod store;

pub use ddl::quote_identifier;
pub use store::{PostgresSchemaStore, SchemaPgPool};
