//! Instrumented cache over a [`KeyValueStore`].

use std::sync::Arc;

use bytes::Bytes;
use reprise_backend::{Batch, BoxError, KeyValueStore};
use reprise_core::{IdentityGenerator, Key, OperationName, RandomIdentity, StoredValue};
use smol_str::SmolStr;
use tracing::{Instrument, debug, debug_span};

use crate::error::CacheError;
use crate::metrics;

/// Name under which [`InstrumentedCache::store`] calls are counted and logged.
pub const STORE_OPERATION: &str = "store";

/// Recorded arguments and results of one operation, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    /// Rendered argument tuples, one per call.
    pub inputs: Vec<String>,
    /// Rendered results, one per call.
    pub outputs: Vec<String>,
}

/// Key-value cache that counts and records every write.
///
/// Each [`store`](Self::store) call writes the value under a fresh random
/// [`Key`], increments the `store` call counter and appends the rendered
/// argument and the returned key to the `store:inputs` / `store:outputs`
/// history lists. All four updates go to the store as one atomic
/// [`Batch`], so the histories stay aligned even when a call fails.
///
/// # Construction flushes the store
///
/// [`InstrumentedCache::new`] and [`InstrumentedCacheBuilder::build`] run
/// `FLUSHDB` on the store before returning. **Every key in the store is
/// deleted**, including keys that belong to other applications or to another
/// namespace. Point the cache at a dedicated database.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use reprise::{InstrumentedCache, replay};
/// use reprise_memory::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = InstrumentedCache::new(Arc::new(MemoryStore::new())).await?;
///
/// let key = cache.store("hello").await?;
/// assert_eq!(cache.get_str(&key).await?, "hello");
///
/// let report = replay(&cache, "store").await?;
/// assert_eq!(report.calls, 1);
/// # Ok(())
/// # }
/// ```
pub struct InstrumentedCache<S: ?Sized, G = RandomIdentity> {
    store: Arc<S>,
    identity: G,
    namespace: Option<SmolStr>,
    operation: OperationName,
}

impl<S, G> std::fmt::Debug for InstrumentedCache<S, G>
where
    S: ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentedCache")
            .field("namespace", &self.namespace)
            .field("operation", &self.operation)
            .field("identity", &std::any::type_name::<G>())
            .finish()
    }
}

impl<S> InstrumentedCache<S, RandomIdentity>
where
    S: KeyValueStore + ?Sized,
{
    /// Flushes `store` and returns a cache over it with default settings.
    ///
    /// **Destructive**: see the [type-level docs](InstrumentedCache).
    pub async fn new(store: Arc<S>) -> Result<Self, CacheError> {
        Self::builder(store).build().await
    }

    /// Starts building a cache over `store`.
    pub fn builder(store: Arc<S>) -> InstrumentedCacheBuilder<S, RandomIdentity> {
        InstrumentedCacheBuilder {
            store,
            identity: RandomIdentity,
            namespace: None,
        }
    }
}

impl<S, G> InstrumentedCache<S, G>
where
    S: KeyValueStore + ?Sized,
    G: IdentityGenerator,
{
    /// Writes `data` under a fresh key and records the call.
    ///
    /// The recorded input is the argument tuple, e.g. `("a",)`; the recorded
    /// output is the returned key.
    pub async fn store(&self, data: impl Into<StoredValue>) -> Result<Key, CacheError> {
        let data = data.into();
        let key = self.identity.new_key();
        let span = debug_span!(
            "reprise.store",
            operation = %self.operation,
            key = %key,
            store = %self.store.label(),
        );

        async move {
            let batch = Batch::new()
                .append_to_list(self.operation.inputs_key(), data.as_argument_tuple())
                .set(self.scoped(key.as_str()), data.to_bytes())
                .append_to_list(self.operation.outputs_key(), key.to_string())
                .increment(self.operation.counter_key());
            self.store.execute(batch).await?;
            metrics::record_store_call(&self.store.label());
            debug!("value stored");
            Ok::<Key, CacheError>(key)
        }
        .instrument(span)
        .await
    }

    /// Raw lookup. `None` means the key is absent (never stored, flushed or
    /// expired).
    pub async fn get(&self, key: impl AsRef<str>) -> Result<Option<Bytes>, CacheError> {
        Ok(self.store.get(&self.scoped(key.as_ref())).await?)
    }

    /// Lookup followed by `decoder`.
    ///
    /// An absent key yields `Ok(None)` without calling `decoder`. A decoder
    /// error is returned as [`CacheError::Decode`].
    pub async fn get_with<T, E, F>(
        &self,
        key: impl AsRef<str>,
        decoder: F,
    ) -> Result<Option<T>, CacheError>
    where
        F: FnOnce(Bytes) -> Result<T, E>,
        E: Into<BoxError>,
    {
        match self.get(key).await? {
            Some(raw) => decoder(raw)
                .map(Some)
                .map_err(|error| CacheError::Decode(error.into())),
            None => Ok(None),
        }
    }

    /// Lookup decoded as UTF-8 text.
    ///
    /// An absent key yields an **empty string**, indistinguishable from a
    /// stored empty string. Use [`get`](Self::get) to tell them apart.
    /// Invalid UTF-8 is an error.
    pub async fn get_str(&self, key: impl AsRef<str>) -> Result<String, CacheError> {
        let text = self.get_with(key, |raw| String::from_utf8(raw.to_vec())).await?;
        Ok(text.unwrap_or_default())
    }

    /// Lookup parsed as a decimal integer.
    ///
    /// Both an absent key and a value that does not parse yield `0`. This is
    /// the one place where a decode failure is not reported; store errors are
    /// still returned.
    pub async fn get_int(&self, key: impl AsRef<str>) -> Result<i64, CacheError> {
        let raw = self.get(key).await?;
        Ok(raw
            .and_then(|raw| std::str::from_utf8(&raw).ok()?.trim().parse().ok())
            .unwrap_or(0))
    }

    /// Number of recorded calls of `operation`, `0` if it was never called.
    pub async fn call_count(&self, operation: &str) -> Result<u64, CacheError> {
        let operation = self.resolve(operation);
        let raw = self.store.get(operation.counter_key()).await?;
        let Some(raw) = raw else {
            return Ok(0);
        };
        std::str::from_utf8(&raw)
            .map_err(|error| CacheError::Decode(error.into()))?
            .parse()
            .map_err(|error: std::num::ParseIntError| CacheError::Decode(error.into()))
    }

    /// Recorded inputs and outputs of `operation`.
    pub async fn history(&self, operation: &str) -> Result<History, CacheError> {
        let operation = self.resolve(operation);
        let inputs = self.store.list_range(&operation.inputs_key(), 0, -1).await?;
        let outputs = self.store.list_range(&operation.outputs_key(), 0, -1).await?;
        Ok(History {
            inputs: inputs.iter().map(lossy).collect(),
            outputs: outputs.iter().map(lossy).collect(),
        })
    }

    /// Name of the tracked `store` operation, including the namespace.
    pub fn operation(&self) -> &OperationName {
        &self.operation
    }

    /// Namespace prefixed to every key, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The underlying store.
    pub fn backing_store(&self) -> &Arc<S> {
        &self.store
    }

    fn scoped(&self, key: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}:{key}"),
            None => key.to_owned(),
        }
    }

    fn resolve(&self, operation: &str) -> OperationName {
        let operation = OperationName::from(operation);
        match &self.namespace {
            Some(namespace) => operation.within(namespace),
            None => operation,
        }
    }
}

fn lossy(raw: &Bytes) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Builder for [`InstrumentedCache`].
///
/// ```
/// use std::sync::Arc;
///
/// use reprise::InstrumentedCache;
/// use reprise_memory::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), reprise::CacheError> {
/// let cache = InstrumentedCache::builder(Arc::new(MemoryStore::new()))
///     .namespace("session-1")
///     .build()
///     .await?;
/// assert_eq!(cache.operation().as_str(), "session-1:store");
/// # Ok(())
/// # }
/// ```
pub struct InstrumentedCacheBuilder<S: ?Sized, G = RandomIdentity> {
    store: Arc<S>,
    identity: G,
    namespace: Option<SmolStr>,
}

impl<S, G> InstrumentedCacheBuilder<S, G>
where
    S: KeyValueStore + ?Sized,
    G: IdentityGenerator,
{
    /// Prefixes every key the cache writes with `namespace:`.
    pub fn namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Replaces the key generator.
    pub fn identity<NewG>(self, identity: NewG) -> InstrumentedCacheBuilder<S, NewG>
    where
        NewG: IdentityGenerator,
    {
        InstrumentedCacheBuilder {
            store: self.store,
            identity,
            namespace: self.namespace,
        }
    }

    /// Flushes the store and returns the cache.
    ///
    /// **Destructive**: see the [type-level docs](InstrumentedCache).
    pub async fn build(self) -> Result<InstrumentedCache<S, G>, CacheError> {
        debug!(store = %self.store.label(), "flushing store for a fresh cache");
        self.store.flush().await?;

        let operation = OperationName::new_static(STORE_OPERATION);
        let operation = match &self.namespace {
            Some(namespace) => operation.within(namespace),
            None => operation,
        };
        Ok(InstrumentedCache {
            store: self.store,
            identity: self.identity,
            namespace: self.namespace,
            operation,
        })
    }
}
