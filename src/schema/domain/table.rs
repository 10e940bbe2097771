//! Table definition aggregate root and draft input.

use super::{
    ColumnDefinition, ColumnId, ParseSchemaValueError, RelationDefinition, RelationId, TableId,
    TableName,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Who manages a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    /// User-managed table exposed through generated routes.
    Backend,
    /// Platform-internal table.
    System,
}

impl TableType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "Backend",
            Self::System => "System",
        }
    }
}

impl TryFrom<&str> for TableType {
    type Error = ParseSchemaValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Backend" => Ok(Self::Backend),
            "System" => Ok(Self::System),
            _ => Err(ParseSchemaValueError {
                kind: "table type",
                value: value.to_owned(),
            }),
        }
    }
}

/// Submitted shape of a table for create and update.
///
/// Drafts carry no owning-table linkage; any present on members is ignored
/// and restamped when the draft is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDraft {
    /// Table name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether the table is enabled.
    pub is_enabled: bool,
    /// Full column list.
    pub columns: Vec<ColumnDefinition>,
    /// Full relation list.
    pub relations: Vec<RelationDefinition>,
}

impl TableDraft {
    /// Creates an enabled draft with no members.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_enabled: true,
            columns: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Seeds a draft from an existing table, keeping member identities.
    #[must_use]
    pub fn from_table(table: &TableDefinition) -> Self {
        Self {
            name: table.name().as_str().to_owned(),
            description: table.description().map(ToOwned::to_owned),
            is_enabled: table.is_enabled(),
            columns: table.columns().iter().map(ColumnDefinition::detached).collect(),
            relations: table
                .relations()
                .iter()
                .map(RelationDefinition::detached)
                .collect(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a relation.
    #[must_use]
    pub fn with_relation(mut self, relation: RelationDefinition) -> Self {
        self.relations.push(relation);
        self
    }

    /// Removes the column named `name`.
    #[must_use]
    pub fn without_column(mut self, name: &str) -> Self {
        self.columns.retain(|column| column.name != name);
        self
    }

    /// Removes the relation with property `property_name`.
    #[must_use]
    pub fn without_relation(mut self, property_name: &str) -> Self {
        self.relations
            .retain(|relation| relation.property_name != property_name);
        self
    }
}

/// Members of a table that an update drops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRemoval {
    /// Columns absent from the submission.
    pub columns: Vec<ColumnId>,
    /// Relations absent from the submission.
    pub relations: Vec<RelationId>,
}

impl MemberRemoval {
    /// Returns `true` when nothing is removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.relations.is_empty()
    }
}

/// Table definition aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    id: TableId,
    name: TableName,
    description: Option<String>,
    is_enabled: bool,
    table_type: TableType,
    columns: Vec<ColumnDefinition>,
    relations: Vec<RelationDefinition>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedTableData {
    /// Persisted table identifier.
    pub id: TableId,
    /// Persisted table name.
    pub name: TableName,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted enabled flag.
    pub is_enabled: bool,
    /// Persisted table type.
    pub table_type: TableType,
    /// Persisted columns.
    pub columns: Vec<ColumnDefinition>,
    /// Persisted outgoing relations.
    pub relations: Vec<RelationDefinition>,
    /// Persisted optimistic concurrency version.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TableDefinition {
    /// Creates a new backend table from a validated draft.
    #[must_use]
    pub fn create(name: TableName, draft: TableDraft, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let id = TableId::new();
        let TableDraft {
            description,
            is_enabled,
            columns,
            relations,
            ..
        } = draft;
        Self {
            id,
            name,
            description,
            is_enabled,
            table_type: TableType::Backend,
            columns: attach_columns(id, columns),
            relations: attach_relations(id, relations),
            version: 1,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a table from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTableData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            is_enabled: data.is_enabled,
            table_type: data.table_type,
            columns: data.columns,
            relations: data.relations,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the members present now but absent from `draft`, by identity.
    #[must_use]
    pub fn removed_members(&self, draft: &TableDraft) -> MemberRemoval {
        let kept_columns: HashSet<ColumnId> = draft.columns.iter().map(|c| c.id).collect();
        let kept_relations: HashSet<RelationId> = draft.relations.iter().map(|r| r.id).collect();
        MemberRemoval {
            columns: self
                .columns
                .iter()
                .map(|column| column.id)
                .filter(|id| !kept_columns.contains(id))
                .collect(),
            relations: self
                .relations
                .iter()
                .map(|relation| relation.id)
                .filter(|id| !kept_relations.contains(id))
                .collect(),
        }
    }

    /// Overwrites scalar fields and reattaches the full member lists.
    ///
    /// Every member is stamped with this table's identifier and the version
    /// is incremented.
    pub fn apply_draft(&mut self, name: TableName, draft: TableDraft, clock: &impl Clock) {
        let TableDraft {
            description,
            is_enabled,
            columns,
            relations,
            ..
        } = draft;
        self.name = name;
        self.description = description;
        self.is_enabled = is_enabled;
        self.columns = attach_columns(self.id, columns);
        self.relations = attach_relations(self.id, relations);
        self.version = self.version.saturating_add(1);
        self.updated_at = clock.utc();
    }

    /// Returns the table identifier.
    #[must_use]
    pub const fn id(&self) -> TableId {
        self.id
    }

    /// Returns the table name.
    #[must_use]
    pub const fn name(&self) -> &TableName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the table is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// Returns the table type.
    #[must_use]
    pub const fn table_type(&self) -> TableType {
        self.table_type
    }

    /// Returns the columns.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Returns the outgoing relations.
    #[must_use]
    pub fn relations(&self) -> &[RelationDefinition] {
        &self.relations
    }

    /// Returns the column named `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Returns the relation with property `property_name`.
    #[must_use]
    pub fn relation(&self, property_name: &str) -> Option<&RelationDefinition> {
        self.relations
            .iter()
            .find(|relation| relation.property_name == property_name)
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn attach_columns(table: TableId, columns: Vec<ColumnDefinition>) -> Vec<ColumnDefinition> {
    columns
        .into_iter()
        .map(|column| ColumnDefinition {
            table_id: Some(table),
            ..column
        })
        .collect()
}

fn attach_relations(table: TableId, relations: Vec<RelationDefinition>) -> Vec<RelationDefinition> {
    relations
        .into_iter()
        .map(|relation| RelationDefinition {
            source_table: Some(table),
            ..relation
        })
        .collect()
}
