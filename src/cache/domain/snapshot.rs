//! Immutable registry snapshot value.

use super::CacheDomainError;
use serde::{Deserialize, Serialize};

/// Ordered list of enabled package names.
///
/// Snapshots are immutable once produced; a reload replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrySnapshot(Vec<String>);

impl RegistrySnapshot {
    /// Creates a snapshot from package names in load order.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self(names.into_iter().collect())
    }

    /// Returns the package names in load order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no package is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` when the snapshot lists `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|candidate| candidate == name)
    }

    /// Encodes the snapshot as the JSON array stored under cache keys.
    ///
    /// # Errors
    ///
    /// Returns [`CacheDomainError::MalformedSnapshot`] if serialisation fails.
    pub fn encode(&self) -> Result<String, CacheDomainError> {
        serde_json::to_string(self)
            .map_err(|err| CacheDomainError::MalformedSnapshot(err.to_string()))
    }

    /// Decodes a stored JSON array of names.
    ///
    /// # Errors
    ///
    /// Returns [`CacheDomainError::MalformedSnapshot`] when the payload is not
    /// a JSON array of strings.
    pub fn decode(payload: &str) -> Result<Self, CacheDomainError> {
        serde_json::from_str(payload)
            .map_err(|err| CacheDomainError::MalformedSnapshot(err.to_string()))
    }
}

impl<S: Into<String>> FromIterator<S> for RegistrySnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into))
    }
}
