//! Table deletion through the mutation service on `PostgreSQL`.

use crate::postgres::helpers::{PgContext, pg_context, table_draft};
use enfyra_core::schema::{
    adapters::{RecordingSchemaSync, postgres::PostgresSchemaStore},
    domain::{
        DeletionStepKind, RelationDefinition, RelationType, SchemaChangeEvent, SchemaChangeKind,
        StepOutcome, TableDefinition, TableId,
    },
    ports::{SchemaStore, SchemaStoreError, SchemaTransaction},
    services::{SchemaMutationError, SchemaMutationService},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

const PHYSICAL_TABLES_SQL: &str = "\
CREATE TABLE customers (id INT PRIMARY KEY); \
CREATE TABLE orders ( \
    id INT PRIMARY KEY, \
    customer_id INT CONSTRAINT fk_orders_customer REFERENCES customers (id) \
); \
CREATE TABLE order_items ( \
    id INT PRIMARY KEY, \
    order_id INT CONSTRAINT fk_items_order REFERENCES orders (id) \
);";

type PgService = SchemaMutationService<PostgresSchemaStore, RecordingSchemaSync, DefaultClock>;

struct DeletionContext {
    store: PostgresSchemaStore,
    sync: RecordingSchemaSync,
    service: PgService,
    context: PgContext,
}

#[fixture]
fn deletion_context(pg_context: PgContext) -> DeletionContext {
    let store = PostgresSchemaStore::new(pg_context.pool.clone());
    let sync = RecordingSchemaSync::new();
    let service = SchemaMutationService::new(
        Arc::new(store.clone()),
        Arc::new(sync.clone()),
        Arc::new(DefaultClock),
    );
    DeletionContext {
        store,
        sync,
        service,
        context: pg_context,
    }
}

struct Linked {
    orders: TableDefinition,
    items: TableDefinition,
}

fn linked_metadata(ctx: &DeletionContext) -> Linked {
    let customers = ctx
        .context
        .rt
        .block_on(ctx.service.create_table(table_draft("customers")))
        .expect("customers created");
    let orders = ctx
        .context
        .rt
        .block_on(ctx.service.create_table(table_draft("orders").with_relation(
            RelationDefinition::new("customer", RelationType::ManyToOne, customers.id()),
        )))
        .expect("orders created");
    let items = ctx
        .context
        .rt
        .block_on(ctx.service.create_table(table_draft("order_items").with_relation(
            RelationDefinition::new("order", RelationType::ManyToOne, orders.id()),
        )))
        .expect("order items created");
    Linked { orders, items }
}

fn stored_table(ctx: &DeletionContext, id: TableId) -> Option<TableDefinition> {
    ctx.context
        .rt
        .block_on(
            ctx.store
                .transaction(move |tx: &mut dyn SchemaTransaction| tx.find_table(id)),
        )
        .expect("metadata readable")
}

#[rstest]
fn delete_runs_every_step_in_order(deletion_context: DeletionContext) {
    let ctx = deletion_context;
    let Linked { orders, items } = linked_metadata(&ctx);
    ctx.context
        .execute(PHYSICAL_TABLES_SQL)
        .expect("physical tables");

    let report = ctx
        .context
        .rt
        .block_on(ctx.service.delete_table(orders.id()))
        .expect("table deleted");

    let kinds: Vec<DeletionStepKind> = report.steps().iter().map(|s| s.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            DeletionStepKind::DeleteRoutes,
            DeletionStepKind::DeleteInboundRelations,
            DeletionStepKind::DropInboundForeignKey("fk_items_order".to_owned()),
            DeletionStepKind::DropOutboundForeignKey("fk_orders_customer".to_owned()),
            DeletionStepKind::DropPhysicalTable,
            DeletionStepKind::DeleteTableMetadata,
        ]
    );
    assert!(report.is_complete());
    assert_eq!(
        report.outcome_of(&DeletionStepKind::DeleteRoutes),
        Some(&StepOutcome::Succeeded { affected: 1 })
    );
    assert_eq!(
        report.outcome_of(&DeletionStepKind::DropPhysicalTable),
        Some(&StepOutcome::Succeeded { affected: 1 })
    );

    assert!(!ctx.context.physical_table_exists("orders").expect("catalog"));
    assert!(ctx.context.physical_table_exists("order_items").expect("catalog"));
    assert!(ctx.context.physical_table_exists("customers").expect("catalog"));
    assert!(stored_table(&ctx, orders.id()).is_none());
    let remaining_items = stored_table(&ctx, items.id()).expect("items kept");
    assert!(remaining_items.relations().is_empty());
    let route = ctx
        .context
        .rt
        .block_on(ctx.store.transaction(|tx: &mut dyn SchemaTransaction| {
            tx.find_route_by_path("/orders")
        }))
        .expect("routes readable");
    assert!(route.is_none());
    assert_eq!(
        ctx.sync.events().expect("events").last(),
        Some(&SchemaChangeEvent::new("orders", SchemaChangeKind::Update))
    );
}

#[rstest]
fn missing_physical_table_counts_as_nothing_dropped(deletion_context: DeletionContext) {
    let ctx = deletion_context;
    let created = ctx
        .context
        .rt
        .block_on(ctx.service.create_table(table_draft("drafts")))
        .expect("table created");

    let report = ctx
        .context
        .rt
        .block_on(ctx.service.delete_table(created.id()))
        .expect("table deleted");

    assert_eq!(
        report.outcome_of(&DeletionStepKind::DropPhysicalTable),
        Some(&StepOutcome::Succeeded { affected: 0 })
    );
    assert!(stored_table(&ctx, created.id()).is_none());
}

#[rstest]
fn unknown_table_is_not_found(deletion_context: DeletionContext) {
    let ctx = deletion_context;
    let missing = TableId::new();

    let result = ctx.context.rt.block_on(ctx.service.delete_table(missing));

    assert!(matches!(
        result,
        Err(SchemaMutationError::ResourceNotFound { table_id }) if table_id == missing
    ));
}

#[rstest]
fn metadata_row_count_is_checked(deletion_context: DeletionContext) {
    let ctx = deletion_context;
    let missing = TableId::new();

    let result = ctx.context.rt.block_on(
        ctx.store
            .transaction(move |tx: &mut dyn SchemaTransaction| tx.delete_table(missing)),
    );

    assert!(matches!(result, Err(SchemaStoreError::NotFound(id)) if id == missing));
}
