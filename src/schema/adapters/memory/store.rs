//! Copy-on-write in-memory schema store.
//!
//! Each transaction works on a private copy of the whole state and swaps it
//! in on success, so a failed operation leaves nothing behind. Physical
//! tables and foreign keys are simulated alongside the metadata rows.

use crate::schema::{
    domain::{
        ColumnDefinition, ColumnId, DropBehavior, ForeignKeyConstraint, PersistedTableData,
        RelationDefinition, RelationId, RouteDefinition, TableDefinition, TableId, TableName,
        TableType,
    },
    ports::{SchemaStore, SchemaStoreError, SchemaStoreResult, SchemaTransaction},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Thread-safe in-memory schema store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaStore {
    state: Arc<Mutex<SchemaState>>,
    open_scopes: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Default)]
struct SchemaState {
    tables: HashMap<TableId, TableRow>,
    columns: Vec<ColumnDefinition>,
    relations: Vec<RelationDefinition>,
    routes: Vec<RouteDefinition>,
    physical_tables: BTreeSet<String>,
    foreign_keys: Vec<ForeignKeyConstraint>,
    undroppable_constraints: HashSet<String>,
}

#[derive(Debug, Clone)]
struct TableRow {
    id: TableId,
    name: TableName,
    description: Option<String>,
    is_enabled: bool,
    table_type: TableType,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct ScopeGuard<'a>(&'a AtomicUsize);

impl<'a> ScopeGuard<'a> {
    fn open(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemorySchemaStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transaction scopes currently open.
    #[must_use]
    pub fn open_scopes(&self) -> usize {
        self.open_scopes.load(Ordering::SeqCst)
    }

    /// Creates a physical table, as schema synchronisation would.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn create_physical_table(&self, name: &str) -> SchemaStoreResult<()> {
        self.with_state(|state| {
            state.physical_tables.insert(name.to_owned());
        })
    }

    /// Adds a physical foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn add_foreign_key(&self, constraint: ForeignKeyConstraint) -> SchemaStoreResult<()> {
        self.with_state(|state| state.foreign_keys.push(constraint))
    }

    /// Makes every attempt to drop `constraint_name` fail.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn fail_drop_of(&self, constraint_name: &str) -> SchemaStoreResult<()> {
        self.with_state(|state| {
            state
                .undroppable_constraints
                .insert(constraint_name.to_owned());
        })
    }

    /// Returns the names of existing physical tables.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn physical_tables(&self) -> SchemaStoreResult<Vec<String>> {
        self.with_state(|state| state.physical_tables.iter().cloned().collect())
    }

    /// Returns the existing physical foreign keys.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn foreign_keys(&self) -> SchemaStoreResult<Vec<ForeignKeyConstraint>> {
        self.with_state(|state| state.foreign_keys.clone())
    }

    /// Returns every stored route.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn routes(&self) -> SchemaStoreResult<Vec<RouteDefinition>> {
        self.with_state(|state| state.routes.clone())
    }

    /// Returns every stored relation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn relations(&self) -> SchemaStoreResult<Vec<RelationDefinition>> {
        self.with_state(|state| state.relations.clone())
    }

    /// Returns every stored column.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn columns(&self) -> SchemaStoreResult<Vec<ColumnDefinition>> {
        self.with_state(|state| state.columns.clone())
    }

    /// Loads a table outside any transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaStoreError::Backend`] when lock acquisition fails.
    pub fn table(&self, id: TableId) -> SchemaStoreResult<Option<TableDefinition>> {
        self.with_state(|state| state.assemble(id))
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SchemaState) -> T) -> SchemaStoreResult<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| SchemaStoreError::backend(std::io::Error::other(err.to_string())))?;
        Ok(f(&mut state))
    }
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn SchemaTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<SchemaStoreError> + Send + 'static,
    {
        let _scope = ScopeGuard::open(&self.open_scopes);
        let mut state = self
            .state
            .lock()
            .map_err(|err| SchemaStoreError::backend(std::io::Error::other(err.to_string())))?;
        let mut working = state.clone();
        let value = work(&mut working)?;
        *state = working;
        Ok(value)
    }
}

impl SchemaState {
    fn assemble(&self, id: TableId) -> Option<TableDefinition> {
        let row = self.tables.get(&id)?;
        Some(TableDefinition::from_persisted(PersistedTableData {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            is_enabled: row.is_enabled,
            table_type: row.table_type,
            columns: self
                .columns
                .iter()
                .filter(|column| column.table_id == Some(id))
                .cloned()
                .collect(),
            relations: self
                .relations
                .iter()
                .filter(|relation| relation.source_table == Some(id))
                .cloned()
                .collect(),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    fn upsert_members(&mut self, table: &TableDefinition) {
        for column in table.columns() {
            match self.columns.iter_mut().find(|stored| stored.id == column.id) {
                Some(stored) => *stored = column.clone(),
                None => self.columns.push(column.clone()),
            }
        }
        for relation in table.relations() {
            match self
                .relations
                .iter_mut()
                .find(|stored| stored.id == relation.id)
            {
                Some(stored) => *stored = relation.clone(),
                None => self.relations.push(relation.clone()),
            }
        }
    }
}

fn row_from(table: &TableDefinition) -> TableRow {
    TableRow {
        id: table.id(),
        name: table.name().clone(),
        description: table.description().map(ToOwned::to_owned),
        is_enabled: table.is_enabled(),
        table_type: table.table_type(),
        version: table.version(),
        created_at: table.created_at(),
        updated_at: table.updated_at(),
    }
}

fn count(removed: usize) -> u64 {
    u64::try_from(removed).unwrap_or(u64::MAX)
}

impl SchemaTransaction for SchemaState {
    fn find_table(&mut self, id: TableId) -> SchemaStoreResult<Option<TableDefinition>> {
        Ok(self.assemble(id))
    }

    fn find_table_by_name(
        &mut self,
        name: &TableName,
    ) -> SchemaStoreResult<Option<TableDefinition>> {
        let id = self
            .tables
            .values()
            .find(|row| &row.name == name)
            .map(|row| row.id);
        Ok(id.and_then(|found| self.assemble(found)))
    }

    fn has_physical_table(&mut self, name: &TableName) -> SchemaStoreResult<bool> {
        Ok(self.physical_tables.contains(name.as_str()))
    }

    fn insert_table(&mut self, table: &TableDefinition) -> SchemaStoreResult<()> {
        if self.tables.values().any(|row| &row.name == table.name()) {
            return Err(SchemaStoreError::Duplicate(table.name().to_string()));
        }
        self.tables.insert(table.id(), row_from(table));
        self.upsert_members(table);
        Ok(())
    }

    fn save_table(&mut self, table: &TableDefinition) -> SchemaStoreResult<()> {
        let stored = self
            .tables
            .get(&table.id())
            .ok_or(SchemaStoreError::NotFound(table.id()))?;
        if stored.version.saturating_add(1) != table.version() {
            return Err(SchemaStoreError::Conflict(table.id()));
        }
        if self
            .tables
            .values()
            .any(|row| row.id != table.id() && &row.name == table.name())
        {
            return Err(SchemaStoreError::Duplicate(table.name().to_string()));
        }
        self.tables.insert(table.id(), row_from(table));
        self.upsert_members(table);
        Ok(())
    }

    fn column_owner(&mut self, id: ColumnId) -> SchemaStoreResult<Option<TableId>> {
        Ok(self
            .columns
            .iter()
            .find(|column| column.id == id)
            .and_then(|column| column.table_id))
    }

    fn relation_owner(&mut self, id: RelationId) -> SchemaStoreResult<Option<TableId>> {
        Ok(self
            .relations
            .iter()
            .find(|relation| relation.id == id)
            .and_then(|relation| relation.source_table))
    }

    fn delete_columns(&mut self, ids: &[ColumnId]) -> SchemaStoreResult<u64> {
        let before = self.columns.len();
        self.columns.retain(|column| !ids.contains(&column.id));
        Ok(count(before - self.columns.len()))
    }

    fn delete_relations(&mut self, ids: &[RelationId]) -> SchemaStoreResult<u64> {
        let before = self.relations.len();
        self.relations.retain(|relation| !ids.contains(&relation.id));
        Ok(count(before - self.relations.len()))
    }

    fn delete_table(&mut self, id: TableId) -> SchemaStoreResult<()> {
        self.tables
            .remove(&id)
            .ok_or(SchemaStoreError::NotFound(id))?;
        self.columns.retain(|column| column.table_id != Some(id));
        self.relations
            .retain(|relation| relation.source_table != Some(id));
        Ok(())
    }

    fn find_route_by_path(&mut self, path: &str) -> SchemaStoreResult<Option<RouteDefinition>> {
        Ok(self.routes.iter().find(|route| route.path == path).cloned())
    }

    fn insert_route(&mut self, route: &RouteDefinition) -> SchemaStoreResult<()> {
        if self.routes.iter().any(|stored| stored.path == route.path) {
            return Err(SchemaStoreError::Duplicate(route.path.clone()));
        }
        self.routes.push(route.clone());
        Ok(())
    }

    fn delete_routes_for_table(&mut self, id: TableId) -> SchemaStoreResult<u64> {
        let before = self.routes.len();
        self.routes.retain(|route| route.main_table != id);
        Ok(count(before - self.routes.len()))
    }

    fn delete_relations_targeting(&mut self, id: TableId) -> SchemaStoreResult<u64> {
        let before = self.relations.len();
        self.relations
            .retain(|relation| relation.target_table != id || relation.source_table == Some(id));
        Ok(count(before - self.relations.len()))
    }

    fn foreign_keys_referencing(
        &mut self,
        table: &TableName,
    ) -> SchemaStoreResult<Vec<ForeignKeyConstraint>> {
        Ok(self
            .foreign_keys
            .iter()
            .filter(|fk| fk.referenced_table == table.as_str() && fk.table_name != table.as_str())
            .cloned()
            .collect())
    }

    fn foreign_keys_from(
        &mut self,
        table: &TableName,
    ) -> SchemaStoreResult<Vec<ForeignKeyConstraint>> {
        Ok(self
            .foreign_keys
            .iter()
            .filter(|fk| fk.table_name == table.as_str())
            .cloned()
            .collect())
    }

    fn drop_foreign_key(&mut self, constraint: &ForeignKeyConstraint) -> SchemaStoreResult<()> {
        if self
            .undroppable_constraints
            .contains(&constraint.constraint_name)
        {
            return Err(SchemaStoreError::backend(std::io::Error::other(format!(
                "cannot drop constraint {}",
                constraint.constraint_name
            ))));
        }
        self.foreign_keys.retain(|fk| {
            fk.constraint_name != constraint.constraint_name
                || fk.table_name != constraint.table_name
        });
        Ok(())
    }

    fn drop_physical_table(
        &mut self,
        table: &TableName,
        behavior: DropBehavior,
    ) -> SchemaStoreResult<bool> {
        if !self.physical_tables.contains(table.as_str()) {
            return Ok(false);
        }
        let dependants: Vec<&str> = self
            .foreign_keys
            .iter()
            .filter(|fk| fk.referenced_table == table.as_str() && fk.table_name != table.as_str())
            .map(|fk| fk.constraint_name.as_str())
            .collect();
        if behavior == DropBehavior::Restrict && !dependants.is_empty() {
            return Err(SchemaStoreError::backend(std::io::Error::other(format!(
                "cannot drop table {table} because {} depend on it",
                dependants.join(", ")
            ))));
        }
        self.physical_tables.remove(table.as_str());
        self.foreign_keys.retain(|fk| {
            fk.table_name != table.as_str() && fk.referenced_table != table.as_str()
        });
        Ok(true)
    }
}
