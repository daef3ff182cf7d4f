//! Test doubles for reprise: a store with call counters and fault
//! injection, a scripted page source and a tracing layer that records
//! `reprise.*` spans.

pub mod mock_source;
pub mod mock_store;
pub mod tracing;

pub use mock_source::MockPageSource;
pub use mock_store::{MockStore, StoreCounters, StoreOp};
pub use tracing::{CapturedSpan, SpanCollector, capture_spans, create_span_collector};
