//! Application services for stale-while-revalidate caching.

mod packages;
mod swr;

pub use packages::PackageCache;
pub use swr::{CacheServiceError, CacheServiceResult, SwrCache};
