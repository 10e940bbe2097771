//! Structural change notifications.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of structural change reported downstream.
///
/// Deletions are reported as [`SchemaChangeKind::Update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaChangeKind {
    /// A table was created.
    Create,
    /// A table was altered or removed.
    Update,
}

impl SchemaChangeKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for SchemaChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload handed to the change propagation hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaChangeEvent {
    /// Name of the affected table.
    pub entity_name: String,
    /// Kind of change.
    #[serde(rename = "type")]
    pub kind: SchemaChangeKind,
}

impl SchemaChangeEvent {
    /// Creates a change event.
    #[must_use]
    pub fn new(entity_name: impl Into<String>, kind: SchemaChangeKind) -> Self {
        Self {
            entity_name: entity_name.into(),
            kind,
        }
    }
}
