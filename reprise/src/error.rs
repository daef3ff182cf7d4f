use std::string::FromUtf8Error;

use reprise_backend::{BoxError, StoreError};
use thiserror::Error;

/// Errors of [`InstrumentedCache`](crate::InstrumentedCache) operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The underlying store failed or was unreachable.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A stored value could not be decoded into the requested type.
    #[error("failed to decode cached value: {0}")]
    Decode(#[source] BoxError),
}

/// Errors of [`CachedFetcher::fetch`](crate::CachedFetcher::fetch).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The underlying store failed or was unreachable.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The page source failed. Carries the source's own error.
    #[error("failed to fetch page: {0}")]
    Network(#[source] BoxError),
    /// A cached page body is not valid UTF-8.
    #[error("cached page is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),
}
