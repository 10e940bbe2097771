//! Cache resource naming and derived key layout.

use super::CacheDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const PRIMARY_PREFIX: &str = "global";
const STALE_PREFIX: &str = "stale";
const REVALIDATING_PREFIX: &str = "revalidating";

/// A logical cached resource and its three derived store keys.
///
/// The key layout is the on-wire contract with the shared store:
/// `global:<id>` holds the fresh copy, `stale:<id>` the non-expiring mirror,
/// and `revalidating:<id>` the background refresh marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheResource {
    id: String,
    primary_key: String,
    stale_key: String,
    revalidating_key: String,
}

impl CacheResource {
    /// Creates a validated resource from its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CacheDomainError::EmptyResource`] when the identifier is
    /// blank, or [`CacheDomainError::InvalidResource`] when it contains a
    /// `:` separator or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, CacheDomainError> {
        let raw = id.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CacheDomainError::EmptyResource);
        }
        if trimmed.chars().any(|c| c == ':' || c.is_whitespace()) {
            return Err(CacheDomainError::InvalidResource(raw));
        }
        Ok(Self::from_valid(trimmed))
    }

    /// The package registry resource.
    #[must_use]
    pub fn packages() -> Self {
        Self::from_valid("packages")
    }

    fn from_valid(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            primary_key: format!("{PRIMARY_PREFIX}:{id}"),
            stale_key: format!("{STALE_PREFIX}:{id}"),
            revalidating_key: format!("{REVALIDATING_PREFIX}:{id}"),
        }
    }

    /// Returns the resource identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key of the TTL-bound authoritative copy.
    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Key of the non-expiring fallback copy.
    #[must_use]
    pub fn stale_key(&self) -> &str {
        &self.stale_key
    }

    /// Key of the short-lived revalidation marker.
    #[must_use]
    pub fn revalidating_key(&self) -> &str {
        &self.revalidating_key
    }
}

impl TryFrom<String> for CacheResource {
    type Error = CacheDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CacheResource> for String {
    fn from(value: CacheResource) -> Self {
        value.id
    }
}

impl fmt::Display for CacheResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
