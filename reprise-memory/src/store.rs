//! In-memory store implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reprise_backend::{Batch, KeyValueStore, StoreResult};
use reprise_core::StoreLabel;
use tokio::time::Instant;
use tracing::trace;

use crate::builder::MemoryStoreBuilder;
use crate::keyspace::Keyspace;

/// Process-local [`KeyValueStore`] with Redis command semantics.
///
/// `MemoryStore` keeps strings and lists in a single mutex-guarded map. It is
/// the store used in tests and demos where no Redis server is around.
///
/// # Examples
///
/// ```
/// use reprise_memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// let named = MemoryStore::builder().label("scratch").build();
/// ```
///
/// # Semantics
///
/// - Expiry is checked lazily on access against [`tokio::time::Instant`],
///   so a paused tokio clock controls it in tests
/// - Batches are applied under one lock; a failing command rolls back every
///   key the batch touched
/// - Type errors (`WRONGTYPE`, non-integer `INCR`) are reported like Redis
///   reports them
///
/// # Caveats
///
/// - Data is **not persisted** and is lost when the last clone is dropped
/// - Data is **not shared** across processes, use Redis for that
///
/// Cloning is cheap: clones share the same keyspace.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    keyspace: Arc<Mutex<Keyspace>>,
    label: StoreLabel,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store labelled `memory`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new store.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }

    pub(crate) fn from_parts(label: StoreLabel) -> Self {
        Self {
            keyspace: Arc::new(Mutex::new(Keyspace::default())),
            label,
        }
    }

    /// Remaining time-to-live of `key`, `None` if the key is missing or
    /// never expires.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.keyspace().ttl(key, Instant::now())
    }

    /// Number of live (unexpired) keys.
    pub fn len(&self) -> usize {
        self.keyspace().len(Instant::now())
    }

    /// Returns `true` when no live key is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn keyspace(&self) -> MutexGuard<'_, Keyspace> {
        // The keyspace is left consistent between commands, so a panic in
        // another holder does not invalidate it.
        self.keyspace.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        trace!(key, "GET");
        Ok(self.keyspace().get(key, Instant::now())?)
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        trace!(key, "SET");
        self.keyspace().set(key, value);
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: Bytes, ttl: Duration) -> StoreResult<()> {
        trace!(key, ttl = ?ttl, "SETEX");
        Ok(self
            .keyspace()
            .set_with_expiry(key, value, ttl, Instant::now())?)
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        trace!(key, "INCR");
        Ok(self.keyspace().increment(key, Instant::now())?)
    }

    async fn append_to_list(&self, key: &str, value: Bytes) -> StoreResult<u64> {
        trace!(key, "RPUSH");
        Ok(self
            .keyspace()
            .append_to_list(key, value, Instant::now())?)
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Bytes>> {
        trace!(key, start, stop, "LRANGE");
        Ok(self
            .keyspace()
            .list_range(key, start, stop, Instant::now())?)
    }

    async fn flush(&self) -> StoreResult<()> {
        trace!("FLUSHDB");
        self.keyspace().flush();
        Ok(())
    }

    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        trace!(commands = batch.len(), "EXEC batch");
        let commands = batch.into_iter().collect();
        Ok(self.keyspace().apply_batch(commands, Instant::now())?)
    }

    fn label(&self) -> StoreLabel {
        self.label.clone()
    }
}
