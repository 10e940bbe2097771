//! Column definitions and column types.

use super::{ColumnId, ParseSchemaValueError, TableId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Logical column type of a managed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// UUID.
    Uuid,
    /// Bounded string.
    Varchar,
    /// Unbounded text.
    Text,
    /// Boolean.
    Boolean,
    /// Floating point number.
    Float,
    /// Exact decimal.
    Decimal,
    /// Calendar date.
    Date,
    /// Timestamp.
    Timestamp,
    /// JSON document.
    Json,
}

impl ColumnType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Uuid => "uuid",
            Self::Varchar => "varchar",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        }
    }

    /// Returns `true` for the types allowed on a primary column.
    #[must_use]
    pub const fn is_primary_key_type(self) -> bool {
        matches!(self, Self::Int | Self::Uuid)
    }
}

impl TryFrom<&str> for ColumnType {
    type Error = ParseSchemaValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "int" => Ok(Self::Int),
            "bigint" => Ok(Self::BigInt),
            "uuid" => Ok(Self::Uuid),
            "varchar" => Ok(Self::Varchar),
            "text" => Ok(Self::Text),
            "boolean" => Ok(Self::Boolean),
            "float" => Ok(Self::Float),
            "decimal" => Ok(Self::Decimal),
            "date" => Ok(Self::Date),
            "timestamp" => Ok(Self::Timestamp),
            "json" => Ok(Self::Json),
            _ => Err(ParseSchemaValueError {
                kind: "column type",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column of a managed table.
///
/// New columns receive a fresh identifier on construction; resubmitting a
/// column with its existing identifier keeps it across an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column identifier.
    pub id: ColumnId,
    /// Column (property) name.
    pub name: String,
    /// Logical column type.
    pub column_type: ColumnType,
    /// Whether the column is the primary key.
    pub is_primary: bool,
    /// Whether `NULL` is allowed.
    pub is_nullable: bool,
    /// Whether the database generates the value.
    pub is_generated: bool,
    /// Default value, if any.
    pub default_value: Option<Value>,
    /// Owning table; set only once attached to a persisted table.
    pub table_id: Option<TableId>,
}

impl ColumnDefinition {
    /// Creates a nullable, non-primary column.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: ColumnId::new(),
            name: name.into(),
            column_type,
            is_primary: false,
            is_nullable: true,
            is_generated: false,
            default_value: None,
            table_id: None,
        }
    }

    /// Creates a generated, non-nullable primary column named `id`.
    #[must_use]
    pub fn primary_id(column_type: ColumnType) -> Self {
        Self::new("id", column_type).primary()
    }

    /// Marks the column as the generated, non-nullable primary key.
    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self.is_generated = true;
        self
    }

    /// Marks the column as not nullable.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Returns a copy without owning-table linkage.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            table_id: None,
            ..self.clone()
        }
    }
}
