//! Diesel row models for cache persistence.

use diesel::prelude::*;

/// Value column returned by live-entry lookups.
#[derive(Debug, Clone, QueryableByName)]
pub struct CacheValueRow {
    /// Serialised cache value.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub value: String,
}
