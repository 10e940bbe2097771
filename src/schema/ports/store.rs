//! Transactional store port for table metadata and the physical schema.

use crate::schema::domain::{
    ColumnId, DropBehavior, ForeignKeyConstraint, RelationId, RouteDefinition, TableDefinition,
    TableId, TableName,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for schema store operations.
pub type SchemaStoreResult<T> = Result<T, SchemaStoreError>;

/// Store that runs schema work inside one connection/transaction scope.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Runs `work` inside a single transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back
    /// otherwise. The connection is released on every exit path. Failures
    /// of the scope itself (acquiring a connection, committing) are
    /// converted into `E`.
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn SchemaTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<SchemaStoreError> + Send + 'static;
}

/// Operations available inside a schema transaction.
pub trait SchemaTransaction {
    /// Loads a table with its columns and relations.
    fn find_table(&mut self, id: TableId) -> SchemaStoreResult<Option<TableDefinition>>;

    /// Loads a table by name with its columns and relations.
    fn find_table_by_name(&mut self, name: &TableName)
    -> SchemaStoreResult<Option<TableDefinition>>;

    /// Reports whether a physical table with this name exists.
    fn has_physical_table(&mut self, name: &TableName) -> SchemaStoreResult<bool>;

    /// Inserts a new table with its columns and relations.
    fn insert_table(&mut self, table: &TableDefinition) -> SchemaStoreResult<()>;

    /// Persists a table's scalar fields and upserts its members.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Conflict`] when the stored version is not
    /// the one preceding `table.version()`.
    fn save_table(&mut self, table: &TableDefinition) -> SchemaStoreResult<()>;

    /// Returns the table owning column `id`, or `None` for an unknown column.
    fn column_owner(&mut self, id: ColumnId) -> SchemaStoreResult<Option<TableId>>;

    /// Returns the table owning relation `id`, or `None` for an unknown
    /// relation.
    fn relation_owner(&mut self, id: RelationId) -> SchemaStoreResult<Option<TableId>>;

    /// Deletes columns by identifier, returning how many were removed.
    fn delete_columns(&mut self, ids: &[ColumnId]) -> SchemaStoreResult<u64>;

    /// Deletes relations by identifier, returning how many were removed.
    fn delete_relations(&mut self, ids: &[RelationId]) -> SchemaStoreResult<u64>;

    /// Deletes a table row; its columns and outgoing relations cascade.
    fn delete_table(&mut self, id: TableId) -> SchemaStoreResult<()>;

    /// Finds the route registered under `path`.
    fn find_route_by_path(&mut self, path: &str) -> SchemaStoreResult<Option<RouteDefinition>>;

    /// Inserts a route.
    fn insert_route(&mut self, route: &RouteDefinition) -> SchemaStoreResult<()>;

    /// Deletes every route whose main table is `id`.
    fn delete_routes_for_table(&mut self, id: TableId) -> SchemaStoreResult<u64>;

    /// Deletes relations owned by other tables that target `id`.
    fn delete_relations_targeting(&mut self, id: TableId) -> SchemaStoreResult<u64>;

    /// Lists foreign keys in other tables that reference `table`.
    fn foreign_keys_referencing(
        &mut self,
        table: &TableName,
    ) -> SchemaStoreResult<Vec<ForeignKeyConstraint>>;

    /// Lists foreign keys declared on `table`.
    fn foreign_keys_from(&mut self, table: &TableName)
    -> SchemaStoreResult<Vec<ForeignKeyConstraint>>;

    /// Drops one foreign key.
    ///
    /// A failure must leave the surrounding transaction usable.
    fn drop_foreign_key(&mut self, constraint: &ForeignKeyConstraint) -> SchemaStoreResult<()>;

    /// Drops the physical table if it exists, reporting whether it did.
    ///
    /// # Errors
    ///
    /// With [`DropBehavior::Restrict`], fails while foreign keys in other
    /// tables still reference `table`.
    fn drop_physical_table(
        &mut self,
        table: &TableName,
        behavior: DropBehavior,
    ) -> SchemaStoreResult<bool>;
}

/// Errors returned by schema store adapters.
#[derive(Debug, Clone, Error)]
pub enum SchemaStoreError {
    /// A row expected to exist was not found.
    #[error("table not found: {0}")]
    NotFound(TableId),

    /// The stored version changed underneath the caller.
    #[error("table {0} was modified concurrently")]
    Conflict(TableId),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate entry: {0}")]
    Duplicate(String),

    /// Persistence-layer or DDL failure.
    #[error("schema store error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl SchemaStoreError {
    /// Wraps a persistence or DDL error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
