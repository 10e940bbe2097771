//! Diesel row models for schema metadata.

use super::schema::{column_definition, relation_definition, route_definition, table_definition};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

/// Table metadata row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = table_definition)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TableRow {
    /// Table identifier.
    pub id: Uuid,
    /// Table name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Enabled flag.
    pub is_enabled: bool,
    /// Table type.
    pub table_type: String,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written when a table is saved.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = table_definition)]
#[diesel(treat_none_as_null = true)]
pub struct TableChangeset {
    /// Table name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Enabled flag.
    pub is_enabled: bool,
    /// New version.
    pub version: i64,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Column metadata row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = column_definition)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRow {
    /// Column identifier.
    pub id: Uuid,
    /// Owning table.
    pub table_id: Uuid,
    /// Column name.
    pub name: String,
    /// Logical column type.
    pub column_type: String,
    /// Primary key flag.
    pub is_primary: bool,
    /// Nullability flag.
    pub nullable: bool,
    /// Generated flag.
    pub is_generated: bool,
    /// Default value.
    pub default_value: Option<Value>,
    /// Position within the table.
    pub position: i32,
}

/// Relation metadata row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = relation_definition)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RelationRow {
    /// Relation identifier.
    pub id: Uuid,
    /// Owning table.
    pub source_table_id: Uuid,
    /// Target table.
    pub target_table_id: Uuid,
    /// Property name.
    pub property_name: String,
    /// Relation cardinality.
    pub relation_type: String,
    /// Inverse property name.
    pub inverse_property_name: Option<String>,
    /// Nullability flag.
    pub nullable: bool,
    /// Position within the table.
    pub position: i32,
}

/// Route row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = route_definition)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RouteRow {
    /// Route identifier.
    pub id: Uuid,
    /// Route path.
    pub path: String,
    /// Table served by the route.
    pub main_table_id: Uuid,
    /// Enabled flag.
    pub is_enabled: bool,
}

/// Foreign key reported by catalog introspection.
#[derive(Debug, Clone, QueryableByName)]
pub struct ForeignKeyRow {
    /// Constraint name.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub constraint_name: String,
    /// Table owning the constraint.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub table_name: String,
    /// Referencing column.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub column_name: String,
    /// Referenced table.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub referenced_table: String,
}

/// Single boolean returned by existence checks.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct PresenceRow {
    /// Whether the checked object exists.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub present: bool,
}
