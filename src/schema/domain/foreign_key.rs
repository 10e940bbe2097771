//! Physical foreign-key constraints discovered through the catalog.

use serde::{Deserialize, Serialize};

/// A foreign-key constraint as reported by catalog introspection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name.
    pub constraint_name: String,
    /// Table that owns the constraint.
    pub table_name: String,
    /// Referencing column.
    pub column_name: String,
    /// Table the constraint points at.
    pub referenced_table: String,
}

impl ForeignKeyConstraint {
    /// Creates a constraint description.
    #[must_use]
    pub fn new(
        constraint_name: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        referenced_table: impl Into<String>,
    ) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            table_name: table_name.into(),
            column_name: column_name.into(),
            referenced_table: referenced_table.into(),
        }
    }
}
