//! Error types for in-memory store operations.
//!
//! All errors convert into [`StoreError::InternalError`]: the store lives in
//! the same process, so there is no connection to lose.
//!
//! [`StoreError::InternalError`]: reprise_backend::StoreError::InternalError

use reprise_backend::StoreError;

/// Error type for [`MemoryStore`](crate::MemoryStore) commands.
///
/// The messages follow the wording Redis uses for the same conditions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A string command hit a list key or the other way round.
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    /// `INCR` on a value that is not a decimal integer.
    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    /// `INCR` would leave the `i64` range.
    #[error("ERR increment or decrement would overflow")]
    Overflow,

    /// `SETEX` with a zero time-to-live.
    #[error("ERR invalid expire time in 'setex' command")]
    InvalidExpireTime,
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        Self::InternalError(Box::new(error))
    }
}
