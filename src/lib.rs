//! Enfyra core: cache coherency and online schema mutation.
//!
//! This crate provides the runtime core of a schema-driven data platform:
//! a distributed stale-while-revalidate cache for registry data and a
//! transactional engine for creating, altering and dropping dynamically
//! managed tables.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (`PostgreSQL`,
//!   in-memory, broadcast bus)
//! - **Services**: Orchestration over ports
//!
//! # Modules
//!
//! - [`cache`]: Stale-while-revalidate cache coherency for the package
//!   registry
//! - [`schema`]: Table lifecycle mutation and change propagation

pub mod cache;
pub mod schema;
