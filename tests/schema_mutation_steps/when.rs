//! When steps for table lifecycle mutation scenarios.

use super::world::{SchemaWorld, run_async};
use enfyra_core::schema::domain::{
    ColumnDefinition, ColumnType, RelationDefinition, RelationType, TableDraft,
};
use rstest_bdd_macros::when;

#[when(r#"a table "{name}" is created with an int primary key"#)]
fn create_table(world: &mut SchemaWorld, name: String) {
    let draft =
        TableDraft::new(name.as_str()).with_column(ColumnDefinition::primary_id(ColumnType::Int));
    let result = run_async(world.service.create_table(draft));
    if let Ok(ref table) = result {
        world.tables.insert(name, table.clone());
    }
    world.last_create = Some(result);
}

#[when(
    r#"a table "{name}" is created with a one-to-many relation "{property}" to "{target}" and no inverse"#
)]
fn create_table_with_bare_one_to_many(
    world: &mut SchemaWorld,
    name: String,
    property: String,
    target: String,
) -> Result<(), eyre::Report> {
    let target_id = world.table(&target)?.id();
    let draft = TableDraft::new(name.as_str())
        .with_column(ColumnDefinition::primary_id(ColumnType::Int))
        .with_relation(RelationDefinition::new(
            property,
            RelationType::OneToMany,
            target_id,
        ));
    world.last_create = Some(run_async(world.service.create_table(draft)));
    Ok(())
}

#[when(r#"the table "{name}" is deleted"#)]
fn delete_table(world: &mut SchemaWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.table(&name)?.id();
    world.last_delete = Some(run_async(world.service.delete_table(id)));
    Ok(())
}
