//! `PostgreSQL` source for the enabled backend package list.

use super::{kv::CachePgPool, schema::package_definition};
use crate::cache::{
    domain::RegistrySnapshot,
    ports::{SnapshotSource, SnapshotSourceError, SnapshotSourceResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

const BACKEND_PACKAGE_TYPE: &str = "Backend";

/// Reads enabled backend package names in definition order.
#[derive(Debug, Clone)]
pub struct PostgresPackageSource {
    pool: CachePgPool,
}

impl PostgresPackageSource {
    /// Creates a source from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: CachePgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotSource for PostgresPackageSource {
    async fn load(&self) -> SnapshotSourceResult<RegistrySnapshot> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(SnapshotSourceError::persistence)?;
            let names = package_definition::table
                .filter(package_definition::is_enabled.eq(true))
                .filter(package_definition::package_type.eq(BACKEND_PACKAGE_TYPE))
                .order(package_definition::id.asc())
                .select(package_definition::name)
                .load::<String>(&mut connection)
                .map_err(SnapshotSourceError::persistence)?;
            Ok(RegistrySnapshot::new(names))
        })
        .await
        .map_err(SnapshotSourceError::persistence)?
    }
}
