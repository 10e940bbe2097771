//! Online schema mutation for dynamically managed tables.
//!
//! Creates, alters and drops table definitions together with their columns,
//! relations, routes and physical database objects inside one transaction
//! scope per operation, then notifies downstream synchronisation through the
//! change propagation hook. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
