//! Validated table name type.

use super::TableDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum identifier length accepted by every supported database.
const MAX_NAME_LENGTH: usize = 64;

/// Table name that is safe to use as a quoted SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Creates a validated table name.
    ///
    /// The input is trimmed. Names must start with an ASCII letter or
    /// underscore and contain only ASCII letters, digits and underscores.
    ///
    /// # Errors
    ///
    /// Returns [`TableDomainError::EmptyTableName`] when the value is empty
    /// after trimming, [`TableDomainError::TableNameTooLong`] when it exceeds
    /// 64 characters, or [`TableDomainError::InvalidTableName`] otherwise.
    pub fn new(value: impl Into<String>) -> Result<Self, TableDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(TableDomainError::EmptyTableName);
        }

        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(TableDomainError::TableNameTooLong(raw));
        }

        if !is_identifier(trimmed) {
            return Err(TableDomainError::InvalidTableName(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the table name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` when `value` is a plain SQL identifier.
pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TryFrom<String> for TableName {
    type Error = TableDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
