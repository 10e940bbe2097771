//! `PostgresSchemaStore` behaviour against a live catalog.

use crate::postgres::helpers::{PgContext, pg_context, table_draft};
use enfyra_core::schema::{
    adapters::{RecordingSchemaSync, postgres::PostgresSchemaStore},
    domain::{
        ColumnDefinition, ColumnType, DropBehavior, ForeignKeyConstraint, TableDraft, TableName,
        ValidationError,
    },
    ports::{SchemaStore, SchemaStoreError, SchemaStoreResult, SchemaTransaction},
    services::{SchemaMutationError, SchemaMutationService, UpdateTableRequest},
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

const LINKED_TABLES_SQL: &str = "\
CREATE TABLE customers (id INT PRIMARY KEY); \
CREATE TABLE orders ( \
    id INT PRIMARY KEY, \
    customer_id INT CONSTRAINT fk_orders_customer REFERENCES customers (id), \
    parent_id INT CONSTRAINT fk_orders_parent REFERENCES orders (id) \
);";

type PgService = SchemaMutationService<PostgresSchemaStore, RecordingSchemaSync, DefaultClock>;

struct StoreContext {
    store: PostgresSchemaStore,
    service: PgService,
    context: PgContext,
}

#[fixture]
fn store_context(pg_context: PgContext) -> StoreContext {
    let store = PostgresSchemaStore::new(pg_context.pool.clone());
    let service = SchemaMutationService::new(
        Arc::new(store.clone()),
        Arc::new(RecordingSchemaSync::new()),
        Arc::new(DefaultClock),
    );
    StoreContext {
        store,
        service,
        context: pg_context,
    }
}

fn table_name(name: &str) -> TableName {
    TableName::new(name).expect("valid table name")
}

fn constraint_names(keys: &[ForeignKeyConstraint]) -> Vec<&str> {
    keys.iter()
        .map(|key| key.constraint_name.as_str())
        .collect()
}

#[rstest]
fn foreign_keys_are_discovered_in_both_directions(store_context: StoreContext) {
    let StoreContext { store, context, .. } = store_context;
    context.execute(LINKED_TABLES_SQL).expect("physical tables");

    let (into_customers, into_orders, from_orders) = context
        .rt
        .block_on(store.transaction(|tx: &mut dyn SchemaTransaction| {
            let customers = table_name("customers");
            let orders = table_name("orders");
            Ok::<_, SchemaStoreError>((
                tx.foreign_keys_referencing(&customers)?,
                tx.foreign_keys_referencing(&orders)?,
                tx.foreign_keys_from(&orders)?,
            ))
        }))
        .expect("catalog readable");

    assert_eq!(constraint_names(&into_customers), vec!["fk_orders_customer"]);
    let inbound = into_customers.first().expect("one inbound key");
    assert_eq!(inbound.table_name, "orders");
    assert_eq!(inbound.column_name, "customer_id");
    assert_eq!(inbound.referenced_table, "customers");
    assert!(into_orders.is_empty(), "self references are not inbound");
    assert_eq!(
        constraint_names(&from_orders),
        vec!["fk_orders_customer", "fk_orders_parent"]
    );
}

#[rstest]
fn failed_constraint_drop_leaves_the_transaction_usable(store_context: StoreContext) {
    let StoreContext { store, context, .. } = store_context;
    context.execute(LINKED_TABLES_SQL).expect("physical tables");

    let missing_drop = context
        .rt
        .block_on(store.transaction(|tx: &mut dyn SchemaTransaction| {
            let missing = ForeignKeyConstraint::new(
                "fk_orders_missing",
                "orders",
                "customer_id",
                "customers",
            );
            let failed = tx.drop_foreign_key(&missing).is_err();
            let real = ForeignKeyConstraint::new(
                "fk_orders_customer",
                "orders",
                "customer_id",
                "customers",
            );
            tx.drop_foreign_key(&real)?;
            Ok::<_, SchemaStoreError>(failed)
        }))
        .expect("transaction committed");
    assert!(missing_drop);

    let remaining = context
        .rt
        .block_on(store.transaction(|tx: &mut dyn SchemaTransaction| {
            tx.foreign_keys_from(&table_name("orders"))
        }))
        .expect("catalog readable");
    assert_eq!(constraint_names(&remaining), vec!["fk_orders_parent"]);
}

#[rstest]
#[case::restrict(DropBehavior::Restrict, false)]
#[case::cascade(DropBehavior::Cascade, true)]
fn referenced_table_drop_follows_the_behavior(
    store_context: StoreContext,
    #[case] behavior: DropBehavior,
    #[case] dropped: bool,
) {
    let StoreContext { store, context, .. } = store_context;
    context.execute(LINKED_TABLES_SQL).expect("physical tables");

    let outcome = context.rt.block_on(store.transaction(
        move |tx: &mut dyn SchemaTransaction| -> SchemaStoreResult<bool> {
            tx.drop_physical_table(&table_name("customers"), behavior)
        },
    ));

    match outcome {
        Ok(removed) => assert!(dropped && removed),
        Err(SchemaStoreError::Backend(_)) => assert!(!dropped),
        Err(other) => panic!("unexpected failure {other:?}"),
    }
    assert_eq!(
        context
            .physical_table_exists("customers")
            .expect("catalog readable"),
        !dropped
    );
}

#[rstest]
fn column_flags_survive_a_round_trip(store_context: StoreContext) {
    let StoreContext {
        store,
        service,
        context,
    } = store_context;
    let optional = ColumnDefinition::new("note", ColumnType::Text);
    let mut required = ColumnDefinition::new("total", ColumnType::Decimal);
    required.is_nullable = false;

    let created = context
        .rt
        .block_on(
            service.create_table(
                table_draft("orders")
                    .with_column(optional)
                    .with_column(required),
            ),
        )
        .expect("table created");
    let stored = context
        .rt
        .block_on(store.transaction(move |tx: &mut dyn SchemaTransaction| {
            tx.find_table(created.id())
        }))
        .expect("readable")
        .expect("table stored");

    let id = stored.column("id").expect("primary column");
    assert!(id.is_primary && !id.is_nullable);
    assert!(stored.column("note").expect("note column").is_nullable);
    assert!(!stored.column("total").expect("total column").is_nullable);
}

#[rstest]
fn stale_save_is_a_conflict(store_context: StoreContext) {
    let StoreContext {
        store,
        service,
        context,
    } = store_context;
    let created = context
        .rt
        .block_on(service.create_table(table_draft("orders")))
        .expect("table created");
    let id = created.id();

    let mut stale = context
        .rt
        .block_on(store.transaction(move |tx: &mut dyn SchemaTransaction| tx.find_table(id)))
        .expect("readable")
        .expect("table stored");
    context
        .rt
        .block_on(service.update_table(UpdateTableRequest::new(
            id,
            TableDraft::from_table(&created).with_description("first writer"),
        )))
        .expect("first update");

    let draft = TableDraft::from_table(&stale).with_description("second writer");
    stale.apply_draft(table_name("orders"), draft, &DefaultClock);
    let saved = context
        .rt
        .block_on(store.transaction(move |tx: &mut dyn SchemaTransaction| {
            tx.save_table(&stale)
        }));

    assert!(matches!(saved, Err(SchemaStoreError::Conflict(conflict)) if conflict == id));
}

#[rstest]
fn wrong_expected_version_is_rejected(store_context: StoreContext) {
    let StoreContext {
        service, context, ..
    } = store_context;
    let created = context
        .rt
        .block_on(service.create_table(table_draft("orders")))
        .expect("table created");

    let result = context.rt.block_on(
        service.update_table(
            UpdateTableRequest::new(
                created.id(),
                TableDraft::from_table(&created).with_description("late"),
            )
            .with_expected_version(7),
        ),
    );

    assert!(matches!(
        result,
        Err(SchemaMutationError::VersionConflict { table_id, expected: 7 })
            if table_id == created.id()
    ));
}

#[rstest]
fn members_of_another_table_are_rejected(store_context: StoreContext) {
    let StoreContext {
        store,
        service,
        context,
    } = store_context;
    let customers = context
        .rt
        .block_on(
            service.create_table(
                table_draft("customers")
                    .with_column(ColumnDefinition::new("email", ColumnType::Varchar)),
            ),
        )
        .expect("customers created");
    let borrowed = customers
        .column("email")
        .cloned()
        .expect("email column");

    let result = context
        .rt
        .block_on(service.create_table(table_draft("orders").with_column(borrowed)));

    assert!(matches!(
        result,
        Err(SchemaMutationError::Validation(ValidationError::ForeignMember { ref property }))
            if property == "email"
    ));
    let kept = context
        .rt
        .block_on(store.transaction(move |tx: &mut dyn SchemaTransaction| {
            tx.find_table(customers.id())
        }))
        .expect("readable")
        .expect("customers kept");
    assert!(kept.column("email").is_some());
}
