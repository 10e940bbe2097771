//! Error types for schema domain validation and parsing.

use super::ColumnType;
use thiserror::Error;

/// Errors returned while constructing table names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableDomainError {
    /// The table name is empty after trimming.
    #[error("table name must not be empty")]
    EmptyTableName,

    /// The table name exceeds the identifier length limit.
    #[error("table name exceeds 64 character limit: {0}")]
    TableNameTooLong(String),

    /// The table name is not a plain SQL identifier.
    #[error(
        "table name '{0}' is invalid (must start with a letter or underscore and contain only letters, digits and underscores)"
    )]
    InvalidTableName(String),
}

/// Structural validation failures for table drafts.
///
/// Every variant names the offending member so callers can report it
/// without parsing messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The table name is invalid.
    #[error(transparent)]
    InvalidTableName(#[from] TableDomainError),

    /// A one-to-many relation does not declare its inverse side.
    #[error("one-to-many relation '{property}' must declare an inverse property name")]
    MissingInverseProperty {
        /// Property name of the offending relation.
        property: String,
    },

    /// No column is marked as primary.
    #[error("table must have a primary column")]
    MissingPrimaryColumn,

    /// More than one column is marked as primary.
    #[error("table must have exactly one primary column, found {count}")]
    MultiplePrimaryColumns {
        /// Number of primary columns submitted.
        count: usize,
    },

    /// The primary column is not named `id`.
    #[error("primary column must be named 'id', found '{name}'")]
    PrimaryColumnNotNamedId {
        /// Name of the submitted primary column.
        name: String,
    },

    /// The primary column type is not a key type.
    #[error("primary column type must be int or uuid, found {column_type}")]
    InvalidPrimaryColumnType {
        /// Submitted primary column type.
        column_type: ColumnType,
    },

    /// A column or relation property name is not a plain identifier.
    #[error("property name '{name}' is invalid")]
    InvalidPropertyName {
        /// Offending property name.
        name: String,
    },

    /// A property name is used more than once across columns and relations.
    #[error("duplicate property name '{name}'")]
    DuplicatePropertyName {
        /// Duplicated property name.
        name: String,
    },

    /// A relation targets a table that does not exist.
    #[error("relation '{property}' targets an unknown table")]
    UnknownRelationTarget {
        /// Property name of the offending relation.
        property: String,
    },

    /// Two submitted members share one identifier.
    #[error("member '{property}' reuses an identifier already submitted")]
    DuplicateMemberId {
        /// Property name of the second member carrying the identifier.
        property: String,
    },

    /// A submitted member is owned by a different table.
    #[error("member '{property}' belongs to another table")]
    ForeignMember {
        /// Property name of the offending member.
        property: String,
    },
}

/// Error returned while parsing schema enums from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseSchemaValueError {
    /// Kind of value being parsed.
    pub kind: &'static str,
    /// Raw value that failed to parse.
    pub value: String,
}
