#![warn(missing_docs)]
//! In-process [`KeyValueStore`](reprise_backend::KeyValueStore) for reprise.
//!
//! [`MemoryStore`] implements the same commands as the Redis store, with the
//! same type rules and expiry behaviour, without a server. Use it in tests,
//! demos and single-process tools.

mod builder;
pub mod error;
mod keyspace;
mod store;

pub use builder::MemoryStoreBuilder;
pub use error::Error;
pub use store::MemoryStore;
