//! Error types for cache domain validation.

use thiserror::Error;

/// Errors returned while constructing cache domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheDomainError {
    /// The resource identifier is empty after trimming.
    #[error("cache resource identifier must not be empty")]
    EmptyResource,

    /// The resource identifier contains a key separator or whitespace.
    #[error("cache resource identifier '{0}' must not contain ':' or whitespace")]
    InvalidResource(String),

    /// A stored snapshot payload could not be decoded.
    #[error("malformed snapshot payload: {0}")]
    MalformedSnapshot(String),
}
