//! In-memory integration tests for the full table lifecycle.

use super::helpers::{CacheFixture, eventually, table_draft};
use enfyra_core::schema::{
    adapters::{CacheReloadHook, InMemorySchemaStore, RecordingSchemaSync},
    domain::{
        ColumnDefinition, ColumnType, DeletionStepKind, ForeignKeyConstraint, RelationDefinition,
        RelationType, SchemaChangeEvent, SchemaChangeKind, TableDraft,
    },
    services::{SchemaMutationService, UpdateTableRequest},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_update_delete_round() -> Result<(), eyre::Report> {
    let store = InMemorySchemaStore::new();
    let sync = RecordingSchemaSync::new();
    let service = SchemaMutationService::new(
        Arc::new(store.clone()),
        Arc::new(sync.clone()),
        Arc::new(DefaultClock),
    );

    let customers = service.create_table(table_draft("customers")).await?;
    let orders = service
        .create_table(
            table_draft("orders")
                .with_column(ColumnDefinition::new("total", ColumnType::Decimal))
                .with_relation(RelationDefinition::new(
                    "customer",
                    RelationType::ManyToOne,
                    customers.id(),
                )),
        )
        .await?;
    let customers = service
        .update_table(
            UpdateTableRequest::new(
                customers.id(),
                TableDraft::from_table(&customers).with_relation(
                    RelationDefinition::new("orders", RelationType::OneToMany, orders.id())
                        .with_inverse("customer"),
                ),
            )
            .with_expected_version(1),
        )
        .await?;
    assert_eq!(customers.version(), 2);

    store.create_physical_table("customers")?;
    store.create_physical_table("orders")?;
    store.add_foreign_key(ForeignKeyConstraint::new(
        "fk_orders_customer",
        "orders",
        "customer_id",
        "customers",
    ))?;

    let report = service.delete_table(customers.id()).await?;

    assert!(report.is_complete());
    assert!(
        report
            .steps()
            .iter()
            .any(|step| step.kind
                == DeletionStepKind::DropInboundForeignKey("fk_orders_customer".to_owned()))
    );
    let remaining_orders = store
        .table(orders.id())?
        .ok_or_else(|| eyre::eyre!("orders table missing"))?;
    assert!(remaining_orders.relations().is_empty());
    assert_eq!(store.physical_tables()?, vec!["orders".to_owned()]);
    assert_eq!(
        sync.events()?,
        vec![
            SchemaChangeEvent::new("customers", SchemaChangeKind::Create),
            SchemaChangeEvent::new("orders", SchemaChangeKind::Create),
            SchemaChangeEvent::new("customers", SchemaChangeKind::Update),
            SchemaChangeEvent::new("customers", SchemaChangeKind::Update),
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn schema_changes_reload_the_package_cache() -> Result<(), eyre::Report> {
    let fixture = CacheFixture::listing(&["pkgA"]);
    fixture.cache.get_packages().await?;
    let service = SchemaMutationService::new(
        Arc::new(InMemorySchemaStore::new()),
        Arc::new(CacheReloadHook::new(fixture.cache.clone())),
        Arc::new(DefaultClock),
    );

    service.create_table(table_draft("orders")).await?;

    let source = fixture.source.clone();
    eventually(|| {
        let loads = source.load_count();
        async move { loads == 2 }
    })
    .await?;
    Ok(())
}
