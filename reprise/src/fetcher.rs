//! Page fetcher with request counting and time-bounded caching.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reprise_backend::KeyValueStore;
use smol_str::SmolStr;
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, debug_span, field};

use crate::error::FetchError;
use crate::metrics;
use crate::source::PageSource;

/// How long a fetched page is served from the store.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(10);

const COUNT_PREFIX: &str = "count:";
const CACHED_PREFIX: &str = "cached:";

/// Fetches pages through a [`PageSource`], caching bodies in a store.
///
/// Every [`fetch`](Self::fetch) increments `count:<url>` once, hit or miss.
/// A body found under `cached:<url>` is returned without touching the
/// source; otherwise the source is called once and the body is written with
/// the configured time-to-live. Expiry is left entirely to the store.
///
/// Unlike [`InstrumentedCache`](crate::InstrumentedCache), the fetcher never
/// flushes its store.
pub struct CachedFetcher<S: ?Sized, P> {
    store: Arc<S>,
    source: P,
    ttl: Duration,
    namespace: Option<SmolStr>,
}

impl<S: ?Sized, P> std::fmt::Debug for CachedFetcher<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFetcher")
            .field("ttl", &self.ttl)
            .field("namespace", &self.namespace)
            .field("source", &std::any::type_name::<P>())
            .finish()
    }
}

impl<S, P> CachedFetcher<S, P>
where
    S: KeyValueStore + ?Sized,
    P: PageSource,
{
    /// Creates a fetcher with the default ten second page TTL.
    pub fn new(store: Arc<S>, source: P) -> Self {
        Self::builder(store, source).build()
    }

    /// Starts building a fetcher.
    pub fn builder(store: Arc<S>, source: P) -> CachedFetcherBuilder<S, P> {
        CachedFetcherBuilder {
            store,
            source,
            ttl: DEFAULT_PAGE_TTL,
            namespace: None,
        }
    }

    /// Returns the body of `url`, from the store when a fresh copy exists.
    ///
    /// Source errors are returned as [`FetchError::Network`] and nothing is
    /// cached for them. The request counter is incremented before the lookup,
    /// so failed fetches are counted too.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let span = debug_span!(
            "reprise.fetch",
            url,
            store = %self.store.label(),
            cache.status = field::Empty,
        );

        async move {
            let count_key = self.scoped(COUNT_PREFIX, url);
            let cached_key = self.scoped(CACHED_PREFIX, url);

            let requests = self.store.increment(&count_key).await?;
            metrics::record_fetch_request(&self.store.label());
            debug!(requests, "request counted");

            if let Some(body) = self.store.get(&cached_key).await? {
                Span::current().record("cache.status", "hit");
                metrics::record_fetch(&self.store.label(), None);
                return Ok(String::from_utf8(body.to_vec())?);
            }

            Span::current().record("cache.status", "miss");
            let started = Instant::now();
            let html = self.source.get(url).await.map_err(FetchError::Network)?;
            metrics::record_fetch(&self.store.label(), Some(started.elapsed()));

            self.store
                .set_with_expiry(&cached_key, Bytes::from(html.clone()), self.ttl)
                .await?;
            debug!(ttl = ?self.ttl, bytes = html.len(), "page cached");
            Ok::<String, FetchError>(html)
        }
        .instrument(span)
        .await
    }

    /// Number of [`fetch`](Self::fetch) calls recorded for `url`.
    pub async fn request_count(&self, url: &str) -> Result<u64, FetchError> {
        let raw = self.store.get(&self.scoped(COUNT_PREFIX, url)).await?;
        Ok(raw
            .and_then(|raw| std::str::from_utf8(&raw).ok()?.parse().ok())
            .unwrap_or(0))
    }

    /// Time-to-live given to cached pages.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The page source.
    pub fn source(&self) -> &P {
        &self.source
    }

    fn scoped(&self, prefix: &str, url: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}:{prefix}{url}"),
            None => format!("{prefix}{url}"),
        }
    }
}

/// Builder for [`CachedFetcher`].
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use reprise::{BoxError, CachedFetcher, PageSource};
/// use reprise_memory::MemoryStore;
///
/// struct Static;
///
/// #[async_trait::async_trait]
/// impl PageSource for Static {
///     async fn get(&self, _url: &str) -> Result<String, BoxError> {
///         Ok("<html/>".into())
///     }
/// }
///
/// let fetcher = CachedFetcher::builder(Arc::new(MemoryStore::new()), Static)
///     .ttl(Duration::from_secs(30))
///     .namespace("crawler")
///     .build();
/// assert_eq!(fetcher.ttl(), Duration::from_secs(30));
/// ```
pub struct CachedFetcherBuilder<S: ?Sized, P> {
    store: Arc<S>,
    source: P,
    ttl: Duration,
    namespace: Option<SmolStr>,
}

impl<S, P> CachedFetcherBuilder<S, P>
where
    S: KeyValueStore + ?Sized,
    P: PageSource,
{
    /// Sets how long fetched pages are served from the store.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Prefixes the counter and page keys with `namespace:`.
    pub fn namespace(mut self, namespace: impl Into<SmolStr>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Builds the fetcher. Nothing is written to the store.
    pub fn build(self) -> CachedFetcher<S, P> {
        CachedFetcher {
            store: self.store,
            source: self.source,
            ttl: self.ttl,
            namespace: self.namespace,
        }
    }
}
