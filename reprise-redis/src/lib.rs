#![warn(missing_docs)]
//! Redis [`KeyValueStore`](reprise_backend::KeyValueStore) for reprise.
//!
//! ```no_run
//! use reprise_redis::RedisStore;
//!
//! let store = RedisStore::builder()
//!     .server("redis://127.0.0.1:6379/2")
//!     .label("sessions")
//!     .build()?;
//! # Ok::<(), reprise_redis::Error>(())
//! ```
//!
//! Batches run as a single Lua script. Scripts execute atomically on the
//! server and check every command before the first write, so the history and
//! counter updates of one instrumented call are applied entirely or not at
//! all, and never interleave with another client.

pub mod error;
pub mod store;

#[doc(inline)]
pub use crate::error::Error;
#[doc(inline)]
pub use crate::store::{RedisStore, RedisStoreBuilder};
