//! Error types for Redis store operations.
//!
//! All errors convert into [`StoreError`] so callers handle Redis and the
//! in-memory store uniformly.
//!
//! [`StoreError`]: reprise_backend::StoreError

use redis::RedisError;
use reprise_backend::StoreError;

/// Error type for Redis store operations.
///
/// # When You'll Encounter This
///
/// - Using [`RedisStoreBuilder::build`] with an invalid connection URL
/// - Performing the first command when Redis is unreachable (the connection
///   is established lazily)
/// - Performing commands the server rejects, such as `INCR` on a list
///
/// [`RedisStoreBuilder::build`]: crate::RedisStoreBuilder::build
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("Redis store error: {0}")]
    Redis(#[from] RedisError),
}

impl Error {
    fn is_connection_failure(&self) -> bool {
        match self {
            Error::Redis(error) => {
                error.is_io_error()
                    || error.is_connection_refusal()
                    || error.is_connection_dropped()
                    || error.is_timeout()
            }
        }
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        if error.is_connection_failure() {
            Self::ConnectionError(Box::new(error))
        } else {
            Self::InternalError(Box::new(error))
        }
    }
}
