//! Metrics recorded by the cache and the fetcher, with their `store` labels.

#![cfg(feature = "metrics")]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use metrics_util::{CompositeKey, MetricKind};
use reprise::{BoxError, CachedFetcher, FetchError, InstrumentedCache, PageSource};
use reprise_memory::MemoryStore;

type SnapshotEntry = (
    CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
);

const URL: &str = "http://example.test/page";

/// Serves a fixed body; fails while `down` is set.
#[derive(Default)]
struct StaticSource {
    down: AtomicBool,
}

#[async_trait]
impl PageSource for StaticSource {
    async fn get(&self, url: &str) -> Result<String, BoxError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(format!("connection refused: {url}").into());
        }
        Ok(format!("<html>{url}</html>"))
    }
}

fn find_counter_in_entries(entries: &[SnapshotEntry], name: &str, store: &str) -> Option<u64> {
    for (key, _, _, value) in entries {
        if key.kind() == MetricKind::Counter && key.key().name() == name {
            for label in key.key().labels() {
                if label.key() == "store"
                    && label.value() == store
                    && let DebugValue::Counter(v) = *value
                {
                    return Some(v);
                }
            }
        }
    }
    None
}

fn histogram_count_in_entries(entries: &[SnapshotEntry], name: &str, store: &str) -> usize {
    for (key, _, _, value) in entries {
        if key.kind() == MetricKind::Histogram && key.key().name() == name {
            for label in key.key().labels() {
                if label.key() == "store"
                    && label.value() == store
                    && let DebugValue::Histogram(v) = value
                {
                    return v.len();
                }
            }
        }
    }
    0
}

/// Runs `body` on a current-thread runtime with `recorder` installed locally.
fn record_with<F, Fut>(recorder: &DebuggingRecorder, body: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    metrics::with_local_recorder(recorder, || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(body())
    });
}

#[test]
fn test_store_call_and_fetches_are_recorded() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    record_with(&recorder, || async {
        let store = Arc::new(MemoryStore::builder().label("sessions").build());
        let cache = InstrumentedCache::new(store.clone()).await.unwrap();
        cache.store("a").await.unwrap();

        let fetcher = CachedFetcher::new(store, StaticSource::default());
        fetcher.fetch(URL).await.unwrap();
        fetcher.fetch(URL).await.unwrap();
    });

    // One snapshot only: histograms are drained when read.
    let entries = snapshotter.snapshot().into_vec();

    assert_eq!(
        find_counter_in_entries(&entries, "reprise_store_calls_total", "sessions"),
        Some(1)
    );
    assert_eq!(
        find_counter_in_entries(&entries, "reprise_fetch_requests_total", "sessions"),
        Some(2)
    );
    assert_eq!(
        find_counter_in_entries(&entries, "reprise_fetch_miss_total", "sessions"),
        Some(1)
    );
    assert_eq!(
        find_counter_in_entries(&entries, "reprise_fetch_hit_total", "sessions"),
        Some(1)
    );
    assert_eq!(
        histogram_count_in_entries(&entries, "reprise_fetch_upstream_duration_seconds", "sessions"),
        1
    );
    assert_eq!(
        find_counter_in_entries(&entries, "reprise_store_calls_total", "memory"),
        None
    );
}

#[test]
fn test_failed_fetch_counts_request_only() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    record_with(&recorder, || async {
        let source = StaticSource::default();
        source.down.store(true, Ordering::SeqCst);
        let fetcher = CachedFetcher::new(Arc::new(MemoryStore::new()), source);

        let result = fetcher.fetch(URL).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    });

    let entries = snapshotter.snapshot().into_vec();

    assert_eq!(
        find_counter_in_entries(&entries, "reprise_fetch_requests_total", "memory"),
        Some(1)
    );
    assert_eq!(
        find_counter_in_entries(&entries, "reprise_fetch_miss_total", "memory"),
        None
    );
    assert_eq!(
        find_counter_in_entries(&entries, "reprise_fetch_hit_total", "memory"),
        None
    );
    assert_eq!(
        histogram_count_in_entries(&entries, "reprise_fetch_upstream_duration_seconds", "memory"),
        0
    );
}

#[test]
fn test_failed_store_call_is_not_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    record_with(&recorder, || async {
        let store = Arc::new(MemoryStore::new());
        let cache = InstrumentedCache::new(store.clone()).await.unwrap();
        reprise::KeyValueStore::set(&*store, "store:outputs", "x".into())
            .await
            .unwrap();

        assert!(cache.store("a").await.is_err());
    });

    let entries = snapshotter.snapshot().into_vec();

    assert_eq!(
        find_counter_in_entries(&entries, "reprise_store_calls_total", "memory"),
        None
    );
}
