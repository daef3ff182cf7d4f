//! Metrics declaration and recording helpers.
//!
//! All metrics follow the pattern `reprise_{component}_{metric}` and carry a
//! `store` label with the store's [`StoreLabel`].

use std::time::Duration;

use reprise_core::StoreLabel;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of instrumented `store` calls.
    pub static ref STORE_CALLS_TOTAL: &'static str = {
        metrics::describe_counter!(
            "reprise_store_calls_total",
            "Total number of instrumented store calls."
        );
        "reprise_store_calls_total"
    };
    /// Track number of page fetch requests, hits and misses alike.
    pub static ref FETCH_REQUESTS_TOTAL: &'static str = {
        metrics::describe_counter!(
            "reprise_fetch_requests_total",
            "Total number of page fetch requests."
        );
        "reprise_fetch_requests_total"
    };
    /// Track number of page fetches served from the store.
    pub static ref FETCH_HIT_TOTAL: &'static str = {
        metrics::describe_counter!(
            "reprise_fetch_hit_total",
            "Total number of page fetches served from cache."
        );
        "reprise_fetch_hit_total"
    };
    /// Track number of page fetches that went to the page source.
    pub static ref FETCH_MISS_TOTAL: &'static str = {
        metrics::describe_counter!(
            "reprise_fetch_miss_total",
            "Total number of page fetches that missed the cache."
        );
        "reprise_fetch_miss_total"
    };
    /// Histogram of page source request durations.
    pub static ref FETCH_UPSTREAM_DURATION: &'static str = {
        metrics::describe_histogram!(
            "reprise_fetch_upstream_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of page source requests in seconds."
        );
        "reprise_fetch_upstream_duration_seconds"
    };
}

/// Record one successful instrumented `store` call.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_store_call(store: &StoreLabel) {
    metrics::counter!(*STORE_CALLS_TOTAL, "store" => store.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_store_call(_store: &StoreLabel) {}

/// Record one page fetch request, counted before the cache lookup.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_fetch_request(store: &StoreLabel) {
    metrics::counter!(*FETCH_REQUESTS_TOTAL, "store" => store.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_fetch_request(_store: &StoreLabel) {}

/// Record the outcome of one page fetch.
///
/// `upstream` is the time spent in the page source, `None` on a cache hit.
/// Fetches whose source call fails record no outcome.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_fetch(store: &StoreLabel, upstream: Option<Duration>) {
    let store = store.to_string();
    match upstream {
        None => metrics::counter!(*FETCH_HIT_TOTAL, "store" => store).increment(1),
        Some(duration) => {
            metrics::counter!(*FETCH_MISS_TOTAL, "store" => store.clone()).increment(1);
            metrics::histogram!(*FETCH_UPSTREAM_DURATION, "store" => store)
                .record(duration.as_secs_f64());
        }
    }
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_fetch(_store: &StoreLabel, _upstream: Option<Duration>) {}
