use std::sync::Arc;
use std::time::Duration;

use reprise::{
    CachedFetcher, CachedFetcherBuilder, DEFAULT_PAGE_TTL, InstrumentedCache,
    InstrumentedCacheBuilder, PageSource,
};
use reprise_backend::KeyValueStore;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::Store;

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    pub store: Store,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub fetcher: FetcherSection,
}

/// Settings of the instrumented cache.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CacheSection {
    /// Prefix for every key the cache writes.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Settings of the cached fetcher.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct FetcherSection {
    /// How long fetched pages are served from the store.
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,
    /// Prefix for the fetcher's counter and page keys.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl Default for FetcherSection {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            namespace: None,
        }
    }
}

fn default_ttl() -> Duration {
    DEFAULT_PAGE_TTL
}

impl Config {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Builds the configured store.
    pub fn into_store(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        self.store.clone().into_store()
    }

    /// Cache builder over `store` with the `cache` section applied.
    ///
    /// Building the cache flushes the store.
    pub fn cache_builder<S>(&self, store: Arc<S>) -> InstrumentedCacheBuilder<S>
    where
        S: KeyValueStore + ?Sized,
    {
        let builder = InstrumentedCache::builder(store);
        match &self.cache.namespace {
            Some(namespace) => builder.namespace(namespace.as_str()),
            None => builder,
        }
    }

    /// Fetcher builder over `store` and `source` with the `fetcher` section
    /// applied.
    pub fn fetcher_builder<S, P>(&self, store: Arc<S>, source: P) -> CachedFetcherBuilder<S, P>
    where
        S: KeyValueStore + ?Sized,
        P: PageSource,
    {
        let builder = CachedFetcher::builder(store, source).ttl(self.fetcher.ttl);
        match &self.fetcher.namespace {
            Some(namespace) => builder.namespace(namespace.as_str()),
            None => builder,
        }
    }
}
