//! Traits and structs for key-value store interaction.
//!
//! If you want to plug reprise into another store, implement
//! [`KeyValueStore`] for it.
mod batch;
mod store;

pub use batch::{Batch, Command};
pub use store::{KeyValueStore, StoreResult};
use thiserror::Error;

/// Boxed error type carried by [`StoreError`] variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// General groups of errors in store interaction.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached: connection refused, dropped or timed out.
    #[error(transparent)]
    ConnectionError(BoxError),
    /// The store was reached but rejected or failed the command.
    ///
    /// For example a list command issued against a string key.
    #[error(transparent)]
    InternalError(BoxError),
}

impl StoreError {
    /// Returns `true` when the store itself was unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::ConnectionError(_))
    }
}
