#![warn(missing_docs)]
//! # reprise
//!
//! An instrumented key-value cache that remembers how it was called.
//!
//! - [`InstrumentedCache`] stores values under fresh random keys and records
//!   every `store` call: a call counter plus aligned input and output
//!   histories, all kept in the store itself.
//! - [`replay`] turns a counter and its histories into a readable trace.
//! - [`CachedFetcher`] counts page requests per URL and serves bodies from the
//!   store for a fixed time-to-live before asking its [`PageSource`] again.
//!
//! Storage is delegated to any [`KeyValueStore`]: `reprise-redis` for Redis,
//! `reprise-memory` for an in-process store.
//!
//! ## Feature Flags
//!
//! - `metrics` - record counters and histograms through the `metrics` crate

/// Instrumented cache and its builder.
pub mod cache;

/// Error types for cache and fetcher operations.
pub mod error;

/// Cached page fetcher and its builder.
pub mod fetcher;

/// Metrics collection for cache observability.
///
/// When the `metrics` feature is enabled, this module provides counters
/// and histograms for store calls and page fetches.
pub mod metrics;

/// Replay of recorded call histories.
pub mod replay;

/// Page source trait used by the fetcher.
pub mod source;

pub use cache::{History, InstrumentedCache, InstrumentedCacheBuilder, STORE_OPERATION};
pub use error::{CacheError, FetchError};
pub use fetcher::{CachedFetcher, CachedFetcherBuilder, DEFAULT_PAGE_TTL};
pub use replay::{Replay, ReplayEntry, replay};
pub use source::PageSource;

pub use reprise_backend::{BoxError, KeyValueStore, StoreError};
pub use reprise_core::{IdentityGenerator, Key, OperationName, RandomIdentity, StoredValue};
