//! Unit tests for the cache coherency layer.
