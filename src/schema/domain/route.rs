//! Route definitions derived from tables.

use super::{RouteId, TableDefinition, TableId};
use serde::{Deserialize, Serialize};

/// HTTP route exposing a managed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Route identifier.
    pub id: RouteId,
    /// Route path, `/` followed by the table name.
    pub path: String,
    /// Table served by the route.
    pub main_table: TableId,
    /// Whether the route is served.
    pub is_enabled: bool,
}

impl RouteDefinition {
    /// Derives the default route for a table.
    #[must_use]
    pub fn for_table(table: &TableDefinition) -> Self {
        Self {
            id: RouteId::new(),
            path: Self::path_for(table.name().as_str()),
            main_table: table.id(),
            is_enabled: true,
        }
    }

    /// Returns the route path for a table name.
    #[must_use]
    pub fn path_for(table_name: &str) -> String {
        format!("/{table_name}")
    }
}
