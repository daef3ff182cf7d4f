use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use reprise_core::StoreLabel;

use crate::{Batch, StoreError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store the cache delegates all storage to.
///
/// The operations mirror the subset of Redis commands the cache needs.
/// Implementations are expected to follow Redis semantics: `increment` on a
/// missing key starts from zero, `list_range` bounds are inclusive and may be
/// negative (counting from the tail), expired entries read as absent.
#[async_trait]
pub trait KeyValueStore: Sync + Send {
    /// `GET key`. `None` when the key is missing or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// `SET key value`, clearing any previous expiry.
    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()>;

    /// `SETEX key ttl value`. Expiry is enforced by the store.
    async fn set_with_expiry(&self, key: &str, value: Bytes, ttl: Duration) -> StoreResult<()>;

    /// `INCR key`, returning the new value.
    async fn increment(&self, key: &str) -> StoreResult<i64>;

    /// `RPUSH key value`, returning the new list length.
    async fn append_to_list(&self, key: &str, value: Bytes) -> StoreResult<u64>;

    /// `LRANGE key start stop`.
    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Bytes>>;

    /// `FLUSHDB`: removes every key of the store.
    async fn flush(&self) -> StoreResult<()>;

    /// Applies every command of `batch` in order, atomically.
    async fn execute(&self, batch: Batch) -> StoreResult<()>;

    /// Returns the label of this store for tracing and metrics.
    fn label(&self) -> StoreLabel {
        StoreLabel::new_static("store")
    }
}

#[async_trait]
impl KeyValueStore for &dyn KeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        (*self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        (*self).set(key, value).await
    }

    async fn set_with_expiry(&self, key: &str, value: Bytes, ttl: Duration) -> StoreResult<()> {
        (*self).set_with_expiry(key, value, ttl).await
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        (*self).increment(key).await
    }

    async fn append_to_list(&self, key: &str, value: Bytes) -> StoreResult<u64> {
        (*self).append_to_list(key, value).await
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Bytes>> {
        (*self).list_range(key, start, stop).await
    }

    async fn flush(&self) -> StoreResult<()> {
        (*self).flush().await
    }

    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        (*self).execute(batch).await
    }

    fn label(&self) -> StoreLabel {
        (*self).label()
    }
}

#[async_trait]
impl KeyValueStore for Box<dyn KeyValueStore> {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn set_with_expiry(&self, key: &str, value: Bytes, ttl: Duration) -> StoreResult<()> {
        (**self).set_with_expiry(key, value, ttl).await
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        (**self).increment(key).await
    }

    async fn append_to_list(&self, key: &str, value: Bytes) -> StoreResult<u64> {
        (**self).append_to_list(key, value).await
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Bytes>> {
        (**self).list_range(key, start, stop).await
    }

    async fn flush(&self) -> StoreResult<()> {
        (**self).flush().await
    }

    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        (**self).execute(batch).await
    }

    fn label(&self) -> StoreLabel {
        (**self).label()
    }
}

#[async_trait]
impl KeyValueStore for Arc<dyn KeyValueStore + Send + 'static> {
    async fn get(&self, key: &str) -> StoreResult<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> StoreResult<()> {
        (**self).set(key, value).await
    }

    async fn set_with_expiry(&self, key: &str, value: Bytes, ttl: Duration) -> StoreResult<()> {
        (**self).set_with_expiry(key, value, ttl).await
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        (**self).increment(key).await
    }

    async fn append_to_list(&self, key: &str, value: Bytes) -> StoreResult<u64> {
        (**self).append_to_list(key, value).await
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<Bytes>> {
        (**self).list_range(key, start, stop).await
    }

    async fn flush(&self) -> StoreResult<()> {
        (**self).flush().await
    }

    async fn execute(&self, batch: Batch) -> StoreResult<()> {
        (**self).execute(batch).await
    }

    fn label(&self) -> StoreLabel {
        (**self).label()
    }
}
