//! Create, update and delete orchestration for managed tables.
//!
//! Each operation validates its input, runs every metadata and DDL change in
//! one store transaction and, once committed, hands a change event to the
//! sync hook without waiting for the downstream work.

use crate::schema::{
    domain::{
        ColumnDefinition, DeletionReport, DeletionStepKind, DropBehavior, ForeignKeyConstraint,
        RelationDefinition, RouteDefinition, SchemaChangeEvent, SchemaChangeKind,
        TableDefinition, TableDraft, TableId, TableName, ValidationError,
        validation::{
            check_has_primary_column, check_inverse_properties, check_primary_column,
            check_unique_member_ids, check_unique_property_names,
        },
    },
    ports::{SchemaStore, SchemaStoreError, SchemaSyncHook, SchemaTransaction},
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Operation a database failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaOperation {
    /// Creating a table.
    CreateTable,
    /// Updating a table.
    UpdateTable,
    /// Deleting a table.
    DeleteTable,
    /// Invoking the sync hook.
    SchemaSync,
    /// Opening or committing the transaction scope.
    Transaction,
}

impl SchemaOperation {
    /// Returns the diagnostic label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTable => "create-table",
            Self::UpdateTable => "update-table",
            Self::DeleteTable => "delete-table",
            Self::SchemaSync => "schema-sync",
            Self::Transaction => "transaction",
        }
    }
}

impl fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for schema mutation.
#[derive(Debug, Clone, Error)]
pub enum SchemaMutationError {
    /// The submitted draft is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A table or route with this name already exists.
    #[error("'{table}' already exists")]
    DuplicateResource {
        /// Colliding name.
        table: String,
    },

    /// No table has this identifier.
    #[error("table {table_id} not found")]
    ResourceNotFound {
        /// Requested table identifier.
        table_id: TableId,
    },

    /// The table changed since the version the caller started from.
    #[error("table {table_id} changed since version {expected}")]
    VersionConflict {
        /// Table identifier.
        table_id: TableId,
        /// Version the caller expected.
        expected: u64,
    },

    /// Unexpected persistence, DDL or hook failure.
    #[error("database error during {operation}: {cause}")]
    Database {
        /// Operation that failed.
        operation: SchemaOperation,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl SchemaMutationError {
    fn database(
        operation: SchemaOperation,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Database {
            operation,
            cause: Arc::new(err),
        }
    }

    fn from_store(operation: SchemaOperation, err: SchemaStoreError) -> Self {
        match err {
            SchemaStoreError::NotFound(table_id) => Self::ResourceNotFound { table_id },
            SchemaStoreError::Duplicate(table) => Self::DuplicateResource { table },
            other => Self::database(operation, other),
        }
    }
}

impl From<SchemaStoreError> for SchemaMutationError {
    fn from(err: SchemaStoreError) -> Self {
        Self::from_store(SchemaOperation::Transaction, err)
    }
}

/// Result type for schema mutation operations.
pub type SchemaMutationResult<T> = Result<T, SchemaMutationError>;

trait StoreResultExt<T> {
    fn during(self, operation: SchemaOperation) -> SchemaMutationResult<T>;
}

impl<T> StoreResultExt<T> for Result<T, SchemaStoreError> {
    fn during(self, operation: SchemaOperation) -> SchemaMutationResult<T> {
        self.map_err(|err| SchemaMutationError::from_store(operation, err))
    }
}

/// Request payload for replacing a table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTableRequest {
    id: TableId,
    draft: TableDraft,
    expected_version: Option<u64>,
}

impl UpdateTableRequest {
    /// Creates a request replacing table `id` with `draft`.
    #[must_use]
    pub const fn new(id: TableId, draft: TableDraft) -> Self {
        Self {
            id,
            draft,
            expected_version: None,
        }
    }

    /// Rejects the update unless the stored version equals `version`.
    #[must_use]
    pub const fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Schema mutation orchestration service.
pub struct SchemaMutationService<S, H, C>
where
    S: SchemaStore,
    H: SchemaSyncHook,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    hook: Arc<H>,
    clock: Arc<C>,
}

impl<S, H, C> Clone for SchemaMutationService<S, H, C>
where
    S: SchemaStore,
    H: SchemaSyncHook,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hook: Arc::clone(&self.hook),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, H, C> SchemaMutationService<S, H, C>
where
    S: SchemaStore,
    H: SchemaSyncHook,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new schema mutation service.
    #[must_use]
    pub const fn new(store: Arc<S>, hook: Arc<H>, clock: Arc<C>) -> Self {
        Self { store, hook, clock }
    }

    /// Creates a table, its metadata and its `/name` route.
    ///
    /// Checks run in this order: inverse properties on one-to-many
    /// relations, name collision with existing metadata or a physical table,
    /// primary column rules, property name uniqueness, member identity and
    /// relation targets. Members already owned by another table are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaMutationError::Validation`],
    /// [`SchemaMutationError::DuplicateResource`] or
    /// [`SchemaMutationError::Database`]. A hook that cannot be invoked
    /// yields `Database` with [`SchemaOperation::SchemaSync`] even though
    /// the table was committed.
    pub async fn create_table(&self, draft: TableDraft) -> SchemaMutationResult<TableDefinition> {
        let name = TableName::new(draft.name.as_str()).map_err(ValidationError::from)?;
        check_inverse_properties(&draft.relations)?;

        let clock = Arc::clone(&self.clock);
        let table = self
            .store
            .transaction(move |tx| -> SchemaMutationResult<TableDefinition> {
                let op = SchemaOperation::CreateTable;
                let taken = tx.find_table_by_name(&name).during(op)?.is_some()
                    || tx.has_physical_table(&name).during(op)?;
                if taken {
                    return Err(SchemaMutationError::DuplicateResource {
                        table: name.as_str().to_owned(),
                    });
                }
                check_primary_column(&draft.columns)?;
                check_unique_property_names(&draft.columns, &draft.relations)?;
                check_unique_member_ids(&draft.columns, &draft.relations)?;
                check_member_owners(tx, None, &draft.columns, &draft.relations, op)?;
                check_relation_targets(tx, None, &draft.relations, op)?;

                let table = TableDefinition::create(name, draft, &*clock);
                tx.insert_table(&table).during(op)?;

                let route = RouteDefinition::for_table(&table);
                if tx.find_route_by_path(&route.path).during(op)?.is_some() {
                    debug!(path = %route.path, "route already registered");
                } else {
                    tx.insert_route(&route).during(op)?;
                }
                Ok(table)
            })
            .await?;

        info!(table = %table.name(), table_id = %table.id(), "table created");
        self.after_effect(SchemaChangeEvent::new(
            table.name().as_str(),
            SchemaChangeKind::Create,
        ))?;
        Ok(table)
    }

    /// Replaces a table's scalar fields and full member lists.
    ///
    /// Members are matched by identity. Members absent from the draft are
    /// deleted before the remaining ones are reattached and the version is
    /// incremented.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaMutationError::Validation`],
    /// [`SchemaMutationError::ResourceNotFound`],
    /// [`SchemaMutationError::VersionConflict`],
    /// [`SchemaMutationError::DuplicateResource`] when renaming onto another
    /// table, or [`SchemaMutationError::Database`].
    pub async fn update_table(
        &self,
        request: UpdateTableRequest,
    ) -> SchemaMutationResult<TableDefinition> {
        let UpdateTableRequest {
            id,
            draft,
            expected_version,
        } = request;
        let name = TableName::new(draft.name.as_str()).map_err(ValidationError::from)?;
        check_inverse_properties(&draft.relations)?;
        check_has_primary_column(&draft.columns)?;
        check_unique_property_names(&draft.columns, &draft.relations)?;
        check_unique_member_ids(&draft.columns, &draft.relations)?;

        let clock = Arc::clone(&self.clock);
        let table = self
            .store
            .transaction(move |tx| -> SchemaMutationResult<TableDefinition> {
                let op = SchemaOperation::UpdateTable;
                let mut table = tx
                    .find_table(id)
                    .during(op)?
                    .ok_or(SchemaMutationError::ResourceNotFound { table_id: id })?;
                let loaded = table.version();
                if let Some(expected) = expected_version.filter(|expected| *expected != loaded) {
                    return Err(SchemaMutationError::VersionConflict {
                        table_id: id,
                        expected,
                    });
                }
                if &name != table.name()
                    && tx
                        .find_table_by_name(&name)
                        .during(op)?
                        .is_some_and(|other| other.id() != id)
                {
                    return Err(SchemaMutationError::DuplicateResource {
                        table: name.as_str().to_owned(),
                    });
                }
                check_member_owners(tx, Some(id), &draft.columns, &draft.relations, op)?;
                check_relation_targets(tx, Some(id), &draft.relations, op)?;

                let removed = table.removed_members(&draft);
                if !removed.columns.is_empty() {
                    tx.delete_columns(&removed.columns).during(op)?;
                }
                if !removed.relations.is_empty() {
                    tx.delete_relations(&removed.relations).during(op)?;
                }
                debug!(
                    table_id = %id,
                    columns = removed.columns.len(),
                    relations = removed.relations.len(),
                    "removed members absent from submission"
                );

                table.apply_draft(name, draft, &*clock);
                tx.save_table(&table).map_err(|err| match err {
                    SchemaStoreError::Conflict(table_id) => SchemaMutationError::VersionConflict {
                        table_id,
                        expected: loaded,
                    },
                    other => SchemaMutationError::from_store(op, other),
                })?;
                Ok(table)
            })
            .await?;

        info!(
            table = %table.name(),
            table_id = %table.id(),
            version = table.version(),
            "table updated"
        );
        self.after_effect(SchemaChangeEvent::new(
            table.name().as_str(),
            SchemaChangeKind::Update,
        ))?;
        Ok(table)
    }

    /// Deletes a table with its routes, inbound relations, foreign keys and
    /// physical table.
    ///
    /// Foreign-key drops are best-effort: a failed drop is recorded as
    /// skipped in the returned report and the deletion continues. When an
    /// inbound key was skipped the physical table is dropped with
    /// [`DropBehavior::Cascade`] so the leftover constraint goes with it. The
    /// change is reported downstream as [`SchemaChangeKind::Update`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaMutationError::ResourceNotFound`] or
    /// [`SchemaMutationError::Database`].
    pub async fn delete_table(&self, id: TableId) -> SchemaMutationResult<DeletionReport> {
        let report = self
            .store
            .transaction(move |tx| run_deletion(tx, id))
            .await?;

        let skipped = report.skipped_steps().count();
        if skipped == 0 {
            info!(table = %report.table(), table_id = %id, "table deleted");
        } else {
            warn!(
                table = %report.table(),
                table_id = %id,
                skipped,
                "table deleted with skipped foreign-key drops"
            );
        }
        self.after_effect(SchemaChangeEvent::new(
            report.table().as_str(),
            SchemaChangeKind::Update,
        ))?;
        Ok(report)
    }

    fn after_effect(&self, event: SchemaChangeEvent) -> SchemaMutationResult<()> {
        let pending = self
            .hook
            .dispatch(event.clone())
            .map_err(|err| SchemaMutationError::database(SchemaOperation::SchemaSync, err))?;
        drop(tokio::spawn(async move {
            match pending.await {
                Ok(()) => debug!(
                    table = %event.entity_name,
                    kind = %event.kind,
                    "schema change propagated"
                ),
                Err(err) => warn!(
                    table = %event.entity_name,
                    kind = %event.kind,
                    error = %err,
                    "schema change propagation failed"
                ),
            }
        }));
        Ok(())
    }
}

fn check_member_owners(
    tx: &mut dyn SchemaTransaction,
    own: Option<TableId>,
    columns: &[ColumnDefinition],
    relations: &[RelationDefinition],
    op: SchemaOperation,
) -> SchemaMutationResult<()> {
    for column in columns {
        let owner = tx.column_owner(column.id).during(op)?;
        if owner.is_some_and(|table| Some(table) != own) {
            return Err(ValidationError::ForeignMember {
                property: column.name.clone(),
            }
            .into());
        }
    }
    for relation in relations {
        let owner = tx.relation_owner(relation.id).during(op)?;
        if owner.is_some_and(|table| Some(table) != own) {
            return Err(ValidationError::ForeignMember {
                property: relation.property_name.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn check_relation_targets(
    tx: &mut dyn SchemaTransaction,
    own: Option<TableId>,
    relations: &[RelationDefinition],
    op: SchemaOperation,
) -> SchemaMutationResult<()> {
    for relation in relations {
        if Some(relation.target_table) == own {
            continue;
        }
        if tx.find_table(relation.target_table).during(op)?.is_none() {
            return Err(ValidationError::UnknownRelationTarget {
                property: relation.property_name.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn run_deletion(
    tx: &mut dyn SchemaTransaction,
    id: TableId,
) -> SchemaMutationResult<DeletionReport> {
    let op = SchemaOperation::DeleteTable;
    let table = tx
        .find_table(id)
        .during(op)?
        .ok_or(SchemaMutationError::ResourceNotFound { table_id: id })?;
    let name = table.name().clone();
    let mut report = DeletionReport::new(name.clone());

    let routes = tx.delete_routes_for_table(id).during(op)?;
    report.succeeded(DeletionStepKind::DeleteRoutes, routes);

    let inbound_relations = tx.delete_relations_targeting(id).during(op)?;
    report.succeeded(DeletionStepKind::DeleteInboundRelations, inbound_relations);

    let mut inbound_left = false;
    for constraint in tx.foreign_keys_referencing(&name).during(op)? {
        let kind = DeletionStepKind::DropInboundForeignKey(constraint.constraint_name.clone());
        inbound_left |= !drop_foreign_key_best_effort(tx, &constraint, kind, &mut report);
    }
    for constraint in tx.foreign_keys_from(&name).during(op)? {
        let kind = DeletionStepKind::DropOutboundForeignKey(constraint.constraint_name.clone());
        drop_foreign_key_best_effort(tx, &constraint, kind, &mut report);
    }

    let (behavior, step) = if inbound_left {
        warn!(table = %name, "inbound foreign keys remain, dropping table with cascade");
        (DropBehavior::Cascade, DeletionStepKind::DropPhysicalTableCascade)
    } else {
        (DropBehavior::Restrict, DeletionStepKind::DropPhysicalTable)
    };
    let dropped = tx.drop_physical_table(&name, behavior).during(op)?;
    report.succeeded(step, u64::from(dropped));

    tx.delete_table(id).during(op)?;
    report.succeeded(DeletionStepKind::DeleteTableMetadata, 1);
    Ok(report)
}

fn drop_foreign_key_best_effort(
    tx: &mut dyn SchemaTransaction,
    constraint: &ForeignKeyConstraint,
    kind: DeletionStepKind,
    report: &mut DeletionReport,
) -> bool {
    match tx.drop_foreign_key(constraint) {
        Ok(()) => {
            debug!(
                constraint = %constraint.constraint_name,
                table = %constraint.table_name,
                "dropped foreign key"
            );
            report.succeeded(kind, 1);
            true
        }
        Err(err) => {
            warn!(
                constraint = %constraint.constraint_name,
                table = %constraint.table_name,
                error = %err,
                "skipping foreign key that could not be dropped"
            );
            report.skipped(kind, err.to_string());
            false
        }
    }
}
