//! Freshness states of a cached resource.

use serde::{Deserialize, Serialize};

/// Observable freshness of one cached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// The primary entry is present.
    Fresh,
    /// The primary entry expired but the stale mirror is present.
    ExpiredWithStale,
    /// Neither copy exists. Initial state before the first load.
    ExpiredNoData,
}

impl CacheState {
    /// Derives the state from which copies are present.
    #[must_use]
    pub const fn from_presence(primary: bool, stale: bool) -> Self {
        match (primary, stale) {
            (true, _) => Self::Fresh,
            (false, true) => Self::ExpiredWithStale,
            (false, false) => Self::ExpiredNoData,
        }
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::ExpiredWithStale => "expired_with_stale",
            Self::ExpiredNoData => "expired_no_data",
        }
    }
}
