//! Distributed cache coherency for hot configuration data.
//!
//! Serves the package registry (and any other named resource) with
//! stale-while-revalidate semantics over a shared key-value store. Readers
//! are answered from the primary entry while it is fresh, from the stale
//! mirror while a single background refresh runs, and only block on the
//! persistent store when neither copy exists. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
