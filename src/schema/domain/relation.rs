//! Relation definitions between managed tables.

use super::{ParseSchemaValueError, RelationId, TableId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    /// One-to-one.
    OneToOne,
    /// One-to-many; requires an inverse property.
    OneToMany,
    /// Many-to-one.
    ManyToOne,
    /// Many-to-many.
    ManyToMany,
}

impl RelationType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToOne => "many-to-one",
            Self::ManyToMany => "many-to-many",
        }
    }
}

impl TryFrom<&str> for RelationType {
    type Error = ParseSchemaValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "one-to-one" => Ok(Self::OneToOne),
            "one-to-many" => Ok(Self::OneToMany),
            "many-to-one" => Ok(Self::ManyToOne),
            "many-to-many" => Ok(Self::ManyToMany),
            _ => Err(ParseSchemaValueError {
                kind: "relation type",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relation from a managed table to another managed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// Relation identifier.
    pub id: RelationId,
    /// Property name on the source table.
    pub property_name: String,
    /// Relation cardinality.
    pub relation_type: RelationType,
    /// Property name on the target table, if the relation is bidirectional.
    pub inverse_property_name: Option<String>,
    /// Owning table; set only once attached to a persisted table.
    pub source_table: Option<TableId>,
    /// Table the relation points at.
    pub target_table: TableId,
    /// Whether the relation may be empty.
    pub is_nullable: bool,
}

impl RelationDefinition {
    /// Creates a nullable relation without an inverse side.
    #[must_use]
    pub fn new(
        property_name: impl Into<String>,
        relation_type: RelationType,
        target_table: TableId,
    ) -> Self {
        Self {
            id: RelationId::new(),
            property_name: property_name.into(),
            relation_type,
            inverse_property_name: None,
            source_table: None,
            target_table,
            is_nullable: true,
        }
    }

    /// Sets the inverse property name.
    #[must_use]
    pub fn with_inverse(mut self, inverse_property_name: impl Into<String>) -> Self {
        self.inverse_property_name = Some(inverse_property_name.into());
        self
    }

    /// Marks the relation as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Returns a copy without owning-table linkage.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            source_table: None,
            ..self.clone()
        }
    }
}
