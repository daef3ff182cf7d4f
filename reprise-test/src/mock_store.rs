use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reprise_backend::{Batch, KeyValueStore, StoreError, StoreResult};
use reprise_core::StoreLabel;
use reprise_memory::MemoryStore;

/// Store commands that can be counted and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Set,
    SetWithExpiry,
    Increment,
    AppendToList,
    ListRange,
    Flush,
    Execute,
}

#[derive(Debug, Default)]
pub struct StoreCounters {
    pub get_count: AtomicUsize,
    pub set_count: AtomicUsize,
    pub set_with_expiry_count: AtomicUsize,
    pub increment_count: AtomicUsize,
    pub append_count: AtomicUsize,
    pub list_range_count: AtomicUsize,
    pub flush_count: AtomicUsize,
    pub execute_count: AtomicUsize,
}

impl StoreCounters {
    fn counter(&self, op: StoreOp) -> &AtomicUsize {
        match op {
            StoreOp::Get => &self.get_count,
            StoreOp::Set => &self.set_count,
            StoreOp::SetWithExpiry => &self.set_with_expiry_count,
            StoreOp::Increment => &self.increment_count,
            StoreOp::AppendToList => &self.append_count,
            StoreOp::ListRange => &self.list_range_count,
            StoreOp::Flush => &self.flush_count,
            StoreOp::Execute => &self.execute_count,
        }
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.counter(op).load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        for op in [
            StoreOp::Get,
            StoreOp::Set,
            StoreOp::SetWithExpiry,
            StoreOp::Increment,
            StoreOp::AppendToList,
            StoreOp::ListRange,
            StoreOp::Flush,
            StoreOp::Execute,
        ] {
            self.counter(op).store(0, Ordering::SeqCst);
        }
    }
}

/// [`MemoryStore`] that counts every command and fails the ones it is told to.
///
/// A failed command is counted but never reaches the inner store, and
/// reports [`StoreError::ConnectionError`] as an unreachable server would.
#[derive(Clone, Debug)]
pub struct MockStore {
    pub inner: MemoryStore,
    pub counters: Arc<StoreCounters>,
    failing: Arc<Mutex<HashSet<StoreOp>>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::builder().label("mock").build(),
            counters: Arc::new(StoreCounters::default()),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Makes every following `op` fail until [`recover`](Self::recover).
    pub fn fail(&self, op: StoreOp) {
        self.failing().insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.failing().remove(&op);
    }

    pub fn recover_all(&self) {
        self.failing().clear();
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.counters.count(op)
    }

    pub fn reset_counters(&self) {
        self.counters.reset();
    }

    fn failing(&self) -> std::sync::MutexGuard<'_, HashSet<StoreOp>> {
        self.failing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, op: StoreOp) -> StoreResult<()> {
        self.counters.counter(op).fetch_add(1, Ordering::SeqCst);
        if self.failing().contains(&op) {
            return Err(StoreError::ConnectionError(Box::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("injected {op:?} failure"),
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MockStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.enter(StoreOp::Get)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.enter(StoreOp::Set)?;
        self.inner.set(key, value).await
    }

    async fn set_with_expiry(&self, key: &str, value: Bytes, ttl: Duration) -> StoreResult<()> {
        self.enter(StoreOp::SetWithExpiry)?;
        self.inner.set_with_expiry(key, value, ttl).await
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        self.enter(StoreOp::Increment)?;
        self.inner.increment(key).await
    }

    async fn append_to_list(&self, key: &str, value: Bytes) -> StoreResult<u64> {
        self.enter(StoreOp::AppendToList)?;
        self.inner.append_to_list(key, value).await
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Bytes>> {
        self.enter(StoreOp::ListRange)?;
        self.inner.list_range(key, start, stop).await
    }

    async fn flush(&self) -> StoreResult<()> {
        self.enter(StoreOp::Flush)?;
        self.inner.flush().await
    }

    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        self.enter(StoreOp::Execute)?;
        self.inner.execute(batch).await
    }

    fn label(&self) -> StoreLabel {
        self.inner.label()
    }
}
