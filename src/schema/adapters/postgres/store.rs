//! `PostgreSQL` schema store running each mutation in one transaction.

use super::{
    ddl::{
        INBOUND_FOREIGN_KEYS_SQL, OUTBOUND_FOREIGN_KEYS_SQL, TABLE_EXISTS_SQL,
        drop_constraint_sql, drop_table_sql,
    },
    models::{
        ColumnRow, ForeignKeyRow, PresenceRow, RelationRow, RouteRow, TableChangeset, TableRow,
    },
    schema::{column_definition, relation_definition, route_definition, table_definition},
};
use crate::schema::{
    domain::{
        ColumnDefinition, ColumnId, ColumnType, DropBehavior, ForeignKeyConstraint,
        PersistedTableData, RelationDefinition, RelationId, RelationType, RouteDefinition, RouteId,
        TableDefinition, TableId, TableName, TableType,
    },
    ports::{SchemaStore, SchemaStoreError, SchemaStoreResult, SchemaTransaction},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;
use diesel::upsert::excluded;

/// `PostgreSQL` connection pool type used by schema adapters.
pub type SchemaPgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema store over the metadata tables and the live catalog.
#[derive(Debug, Clone)]
pub struct PostgresSchemaStore {
    pool: SchemaPgPool,
}

impl PostgresSchemaStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: SchemaPgPool) -> Self {
        Self { pool }
    }
}

enum TxFailure<E> {
    Work(E),
    Diesel(DieselError),
}

impl<E> From<DieselError> for TxFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Diesel(err)
    }
}

#[async_trait]
impl SchemaStore for PostgresSchemaStore {
    async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn SchemaTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<SchemaStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool
                .get()
                .map_err(|err| E::from(SchemaStoreError::backend(err)))?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TxFailure<E>, _>(|conn| {
                    let mut tx = PgSchemaTransaction { conn };
                    work(&mut tx).map_err(TxFailure::Work)
                })
                .map_err(|failure| match failure {
                    TxFailure::Work(err) => err,
                    TxFailure::Diesel(err) => E::from(SchemaStoreError::backend(err)),
                })
        })
        .await
        .map_err(|err| E::from(SchemaStoreError::backend(err)))?
    }
}

struct PgSchemaTransaction<'conn> {
    conn: &'conn mut PgConnection,
}

impl PgSchemaTransaction<'_> {
    fn load_members(&mut self, row: TableRow) -> SchemaStoreResult<TableDefinition> {
        let columns = column_definition::table
            .filter(column_definition::table_id.eq(row.id))
            .order(column_definition::position.asc())
            .select(ColumnRow::as_select())
            .load::<ColumnRow>(self.conn)
            .map_err(SchemaStoreError::backend)?;
        let relations = relation_definition::table
            .filter(relation_definition::source_table_id.eq(row.id))
            .order(relation_definition::position.asc())
            .select(RelationRow::as_select())
            .load::<RelationRow>(self.conn)
            .map_err(SchemaStoreError::backend)?;
        row_to_table(row, columns, relations)
    }

    fn write_members(&mut self, table: &TableDefinition) -> SchemaStoreResult<()> {
        let columns = column_rows(table)?;
        if !columns.is_empty() {
            diesel::insert_into(column_definition::table)
                .values(&columns)
                .on_conflict(column_definition::id)
                .do_update()
                .set((
                    column_definition::name.eq(excluded(column_definition::name)),
                    column_definition::column_type.eq(excluded(column_definition::column_type)),
                    column_definition::is_primary.eq(excluded(column_definition::is_primary)),
                    column_definition::nullable.eq(excluded(column_definition::nullable)),
                    column_definition::is_generated.eq(excluded(column_definition::is_generated)),
                    column_definition::default_value.eq(excluded(column_definition::default_value)),
                    column_definition::position.eq(excluded(column_definition::position)),
                ))
                .execute(self.conn)
                .map_err(|err| unique_as_duplicate(err, table.name().as_str()))?;
        }

        let relations = relation_rows(table)?;
        if !relations.is_empty() {
            diesel::insert_into(relation_definition::table)
                .values(&relations)
                .on_conflict(relation_definition::id)
                .do_update()
                .set((
                    relation_definition::target_table_id
                        .eq(excluded(relation_definition::target_table_id)),
                    relation_definition::property_name
                        .eq(excluded(relation_definition::property_name)),
                    relation_definition::relation_type
                        .eq(excluded(relation_definition::relation_type)),
                    relation_definition::inverse_property_name
                        .eq(excluded(relation_definition::inverse_property_name)),
                    relation_definition::nullable.eq(excluded(relation_definition::nullable)),
                    relation_definition::position.eq(excluded(relation_definition::position)),
                ))
                .execute(self.conn)
                .map_err(|err| unique_as_duplicate(err, table.name().as_str()))?;
        }
        Ok(())
    }

    fn foreign_keys(
        &mut self,
        sql: &str,
        table: &TableName,
    ) -> SchemaStoreResult<Vec<ForeignKeyConstraint>> {
        let rows = diesel::sql_query(sql)
            .bind::<Text, _>(table.as_str())
            .load::<ForeignKeyRow>(self.conn)
            .map_err(SchemaStoreError::backend)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                ForeignKeyConstraint::new(
                    row.constraint_name,
                    row.table_name,
                    row.column_name,
                    row.referenced_table,
                )
            })
            .collect())
    }
}

impl SchemaTransaction for PgSchemaTransaction<'_> {
    fn find_table(&mut self, id: TableId) -> SchemaStoreResult<Option<TableDefinition>> {
        let row = table_definition::table
            .filter(table_definition::id.eq(id.into_inner()))
            .select(TableRow::as_select())
            .first::<TableRow>(self.conn)
            .optional()
            .map_err(SchemaStoreError::backend)?;
        row.map(|found| self.load_members(found)).transpose()
    }

    fn find_table_by_name(
        &mut self,
        name: &TableName,
    ) -> SchemaStoreResult<Option<TableDefinition>> {
        let row = table_definition::table
            .filter(table_definition::name.eq(name.as_str()))
            .select(TableRow::as_select())
            .first::<TableRow>(self.conn)
            .optional()
            .map_err(SchemaStoreError::backend)?;
        row.map(|found| self.load_members(found)).transpose()
    }

    fn has_physical_table(&mut self, name: &TableName) -> SchemaStoreResult<bool> {
        let row = diesel::sql_query(TABLE_EXISTS_SQL)
            .bind::<Text, _>(name.as_str())
            .get_result::<PresenceRow>(self.conn)
            .map_err(SchemaStoreError::backend)?;
        Ok(row.present)
    }

    fn insert_table(&mut self, table: &TableDefinition) -> SchemaStoreResult<()> {
        let row = table_row(table)?;
        diesel::insert_into(table_definition::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| unique_as_duplicate(err, table.name().as_str()))?;
        self.write_members(table)
    }

    fn save_table(&mut self, table: &TableDefinition) -> SchemaStoreResult<()> {
        let version = to_db_version(table.version())?;
        let changeset = TableChangeset {
            name: table.name().as_str().to_owned(),
            description: table.description().map(ToOwned::to_owned),
            is_enabled: table.is_enabled(),
            version,
            updated_at: table.updated_at(),
        };
        let updated = diesel::update(
            table_definition::table
                .filter(table_definition::id.eq(table.id().into_inner()))
                .filter(table_definition::version.eq(version.saturating_sub(1))),
        )
        .set(&changeset)
        .execute(self.conn)
        .map_err(|err| unique_as_duplicate(err, table.name().as_str()))?;

        if updated == 0 {
            let exists = diesel::select(diesel::dsl::exists(
                table_definition::table.filter(table_definition::id.eq(table.id().into_inner())),
            ))
            .get_result::<bool>(self.conn)
            .map_err(SchemaStoreError::backend)?;
            return Err(if exists {
                SchemaStoreError::Conflict(table.id())
            } else {
                SchemaStoreError::NotFound(table.id())
            });
        }
        self.write_members(table)
    }

    fn column_owner(&mut self, id: ColumnId) -> SchemaStoreResult<Option<TableId>> {
        column_definition::table
            .filter(column_definition::id.eq(id.into_inner()))
            .select(column_definition::table_id)
            .first::<uuid::Uuid>(self.conn)
            .optional()
            .map(|owner| owner.map(TableId::from_uuid))
            .map_err(SchemaStoreError::backend)
    }

    fn relation_owner(&mut self, id: RelationId) -> SchemaStoreResult<Option<TableId>> {
        relation_definition::table
            .filter(relation_definition::id.eq(id.into_inner()))
            .select(relation_definition::source_table_id)
            .first::<uuid::Uuid>(self.conn)
            .optional()
            .map(|owner| owner.map(TableId::from_uuid))
            .map_err(SchemaStoreError::backend)
    }

    fn delete_columns(&mut self, ids: &[ColumnId]) -> SchemaStoreResult<u64> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        diesel::delete(column_definition::table.filter(column_definition::id.eq_any(uuids)))
            .execute(self.conn)
            .map(affected)
            .map_err(SchemaStoreError::backend)
    }

    fn delete_relations(&mut self, ids: &[RelationId]) -> SchemaStoreResult<u64> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        diesel::delete(relation_definition::table.filter(relation_definition::id.eq_any(uuids)))
            .execute(self.conn)
            .map(affected)
            .map_err(SchemaStoreError::backend)
    }

    fn delete_table(&mut self, id: TableId) -> SchemaStoreResult<()> {
        let raw = id.into_inner();
        diesel::delete(column_definition::table.filter(column_definition::table_id.eq(raw)))
            .execute(self.conn)
            .map_err(SchemaStoreError::backend)?;
        diesel::delete(
            relation_definition::table.filter(relation_definition::source_table_id.eq(raw)),
        )
        .execute(self.conn)
        .map_err(SchemaStoreError::backend)?;
        let removed = diesel::delete(table_definition::table.filter(table_definition::id.eq(raw)))
            .execute(self.conn)
            .map_err(SchemaStoreError::backend)?;
        if removed == 0 {
            return Err(SchemaStoreError::NotFound(id));
        }
        Ok(())
    }

    fn find_route_by_path(&mut self, path: &str) -> SchemaStoreResult<Option<RouteDefinition>> {
        let row = route_definition::table
            .filter(route_definition::path.eq(path))
            .select(RouteRow::as_select())
            .first::<RouteRow>(self.conn)
            .optional()
            .map_err(SchemaStoreError::backend)?;
        Ok(row.map(|found| RouteDefinition {
            id: RouteId::from_uuid(found.id),
            path: found.path,
            main_table: TableId::from_uuid(found.main_table_id),
            is_enabled: found.is_enabled,
        }))
    }

    fn insert_route(&mut self, route: &RouteDefinition) -> SchemaStoreResult<()> {
        let row = RouteRow {
            id: route.id.into_inner(),
            path: route.path.clone(),
            main_table_id: route.main_table.into_inner(),
            is_enabled: route.is_enabled,
        };
        diesel::insert_into(route_definition::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| unique_as_duplicate(err, &route.path))?;
        Ok(())
    }

    fn delete_routes_for_table(&mut self, id: TableId) -> SchemaStoreResult<u64> {
        diesel::delete(
            route_definition::table.filter(route_definition::main_table_id.eq(id.into_inner())),
        )
        .execute(self.conn)
        .map(affected)
        .map_err(SchemaStoreError::backend)
    }

    fn delete_relations_targeting(&mut self, id: TableId) -> SchemaStoreResult<u64> {
        let raw = id.into_inner();
        diesel::delete(
            relation_definition::table
                .filter(relation_definition::target_table_id.eq(raw))
                .filter(relation_definition::source_table_id.ne(raw)),
        )
        .execute(self.conn)
        .map(affected)
        .map_err(SchemaStoreError::backend)
    }

    fn foreign_keys_referencing(
        &mut self,
        table: &TableName,
    ) -> SchemaStoreResult<Vec<ForeignKeyConstraint>> {
        self.foreign_keys(INBOUND_FOREIGN_KEYS_SQL, table)
    }

    fn foreign_keys_from(
        &mut self,
        table: &TableName,
    ) -> SchemaStoreResult<Vec<ForeignKeyConstraint>> {
        self.foreign_keys(OUTBOUND_FOREIGN_KEYS_SQL, table)
    }

    fn drop_foreign_key(&mut self, constraint: &ForeignKeyConstraint) -> SchemaStoreResult<()> {
        let statement = drop_constraint_sql(&constraint.table_name, &constraint.constraint_name);
        // Nested transaction runs under a savepoint.
        self.conn
            .transaction::<_, DieselError, _>(|conn| diesel::sql_query(statement).execute(conn))
            .map(|_| ())
            .map_err(SchemaStoreError::backend)
    }

    fn drop_physical_table(
        &mut self,
        table: &TableName,
        behavior: DropBehavior,
    ) -> SchemaStoreResult<bool> {
        if !self.has_physical_table(table)? {
            return Ok(false);
        }
        diesel::sql_query(drop_table_sql(table.as_str(), behavior))
            .execute(self.conn)
            .map_err(SchemaStoreError::backend)?;
        Ok(true)
    }
}

fn affected(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

fn unique_as_duplicate(err: DieselError, subject: &str) -> SchemaStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            SchemaStoreError::Duplicate(subject.to_owned())
        }
        other => SchemaStoreError::backend(other),
    }
}

fn to_db_version(version: u64) -> SchemaStoreResult<i64> {
    i64::try_from(version).map_err(SchemaStoreError::backend)
}

fn position(index: usize) -> SchemaStoreResult<i32> {
    i32::try_from(index).map_err(SchemaStoreError::backend)
}

fn table_row(table: &TableDefinition) -> SchemaStoreResult<TableRow> {
    Ok(TableRow {
        id: table.id().into_inner(),
        name: table.name().as_str().to_owned(),
        description: table.description().map(ToOwned::to_owned),
        is_enabled: table.is_enabled(),
        table_type: table.table_type().as_str().to_owned(),
        version: to_db_version(table.version())?,
        created_at: table.created_at(),
        updated_at: table.updated_at(),
    })
}

fn column_rows(table: &TableDefinition) -> SchemaStoreResult<Vec<ColumnRow>> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            Ok(ColumnRow {
                id: column.id.into_inner(),
                table_id: table.id().into_inner(),
                name: column.name.clone(),
                column_type: column.column_type.as_str().to_owned(),
                is_primary: column.is_primary,
                nullable: column.is_nullable,
                is_generated: column.is_generated,
                default_value: column.default_value.clone(),
                position: position(index)?,
            })
        })
        .collect()
}

fn relation_rows(table: &TableDefinition) -> SchemaStoreResult<Vec<RelationRow>> {
    table
        .relations()
        .iter()
        .enumerate()
        .map(|(index, relation)| {
            Ok(RelationRow {
                id: relation.id.into_inner(),
                source_table_id: table.id().into_inner(),
                target_table_id: relation.target_table.into_inner(),
                property_name: relation.property_name.clone(),
                relation_type: relation.relation_type.as_str().to_owned(),
                inverse_property_name: relation.inverse_property_name.clone(),
                nullable: relation.is_nullable,
                position: position(index)?,
            })
        })
        .collect()
}

fn row_to_table(
    row: TableRow,
    column_records: Vec<ColumnRow>,
    relation_records: Vec<RelationRow>,
) -> SchemaStoreResult<TableDefinition> {
    let TableRow {
        id,
        name,
        description,
        is_enabled,
        table_type,
        version,
        created_at,
        updated_at,
    } = row;
    let table_id = TableId::from_uuid(id);

    let columns = column_records
        .into_iter()
        .map(|column| {
            Ok(ColumnDefinition {
                id: ColumnId::from_uuid(column.id),
                name: column.name,
                column_type: ColumnType::try_from(column.column_type.as_str())
                    .map_err(SchemaStoreError::backend)?,
                is_primary: column.is_primary,
                is_nullable: column.nullable,
                is_generated: column.is_generated,
                default_value: column.default_value,
                table_id: Some(table_id),
            })
        })
        .collect::<SchemaStoreResult<Vec<_>>>()?;

    let relations = relation_records
        .into_iter()
        .map(|relation| {
            Ok(RelationDefinition {
                id: RelationId::from_uuid(relation.id),
                property_name: relation.property_name,
                relation_type: RelationType::try_from(relation.relation_type.as_str())
                    .map_err(SchemaStoreError::backend)?,
                inverse_property_name: relation.inverse_property_name,
                source_table: Some(table_id),
                target_table: TableId::from_uuid(relation.target_table_id),
                is_nullable: relation.nullable,
            })
        })
        .collect::<SchemaStoreResult<Vec<_>>>()?;

    Ok(TableDefinition::from_persisted(PersistedTableData {
        id: table_id,
        name: TableName::new(name).map_err(SchemaStoreError::backend)?,
        description,
        is_enabled,
        table_type: TableType::try_from(table_type.as_str()).map_err(SchemaStoreError::backend)?,
        columns,
        relations,
        version: u64::try_from(version).map_err(SchemaStoreError::backend)?,
        created_at,
        updated_at,
    }))
}
