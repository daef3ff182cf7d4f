//! Capture of `reprise.*` spans for assertions in tests.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::Dispatch;
use tracing::Subscriber;
use tracing::instrument::WithSubscriber;
use tracing::span::{Attributes, Id, Record};
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

const CAPTURED_PREFIX: &str = "reprise.";

/// Captured span information for testing.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub id: u64,
    pub parent_id: Option<u64>,
    /// The span name (e.g., "reprise.fetch")
    pub name: String,
    pub target: String,
    /// Field values as strings, updated by later `record` calls.
    pub fields: Vec<(String, String)>,
}

impl CapturedSpan {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A tracing layer that records every `reprise.*` span.
pub struct SpanCaptureLayer {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

impl SpanCaptureLayer {
    fn spans(&self) -> MutexGuard<'_, Vec<CapturedSpan>> {
        self.spans.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct FieldVisitor {
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields
            .push((field.name().to_string(), format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }
}

impl<S> Layer<S> for SpanCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let metadata = attrs.metadata();
        if !metadata.name().starts_with(CAPTURED_PREFIX) {
            return;
        }

        let mut visitor = FieldVisitor { fields: Vec::new() };
        attrs.record(&mut visitor);

        let parent_id = attrs
            .parent()
            .cloned()
            .or_else(|| {
                if attrs.is_contextual() {
                    ctx.current_span().id().cloned()
                } else {
                    None
                }
            })
            .map(|id| id.into_u64());

        self.spans().push(CapturedSpan {
            id: id.into_u64(),
            parent_id,
            name: metadata.name().to_string(),
            target: metadata.target().to_string(),
            fields: visitor.fields,
        });
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span_ref) = ctx.span(id) else {
            return;
        };
        if !span_ref.metadata().name().starts_with(CAPTURED_PREFIX) {
            return;
        }

        let mut visitor = FieldVisitor { fields: Vec::new() };
        values.record(&mut visitor);

        let span_id = id.into_u64();
        let mut spans = self.spans();
        if let Some(captured) = spans.iter_mut().find(|s| s.id == span_id) {
            for (key, value) in visitor.fields {
                if let Some(existing) = captured.fields.iter_mut().find(|(k, _)| k == &key) {
                    existing.1 = value;
                } else {
                    captured.fields.push((key, value));
                }
            }
        }
    }
}

/// Collector for captured spans.
#[derive(Clone)]
pub struct SpanCollector {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    dispatch: Dispatch,
}

/// Create a new span collector with its associated dispatch.
pub fn create_span_collector() -> SpanCollector {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let layer = SpanCaptureLayer {
        spans: spans.clone(),
    };
    let subscriber = Registry::default().with(layer);
    SpanCollector {
        spans,
        dispatch: Dispatch::new(subscriber),
    }
}

/// Drives `future` with span capturing enabled.
///
/// ```ignore
/// let (body, spans) = capture_spans(fetcher.fetch(url)).await;
/// assert_eq!(spans.get_field("reprise.fetch", "cache.status").as_deref(), Some("miss"));
/// ```
pub async fn capture_spans<F>(future: F) -> (F::Output, SpanCollector)
where
    F: Future,
{
    let collector = create_span_collector();
    let output = future.with_subscriber(collector.dispatch.clone()).await;
    (output, collector)
}

impl SpanCollector {
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CapturedSpan>> {
        self.spans.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.lock().clone()
    }

    /// Span names in creation order.
    pub fn span_names(&self) -> Vec<String> {
        self.lock().iter().map(|s| s.name.clone()).collect()
    }

    /// All spans named `name`, in creation order.
    pub fn spans_named(&self, name: &str) -> Vec<CapturedSpan> {
        self.lock()
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }

    pub fn has_span(&self, name: &str) -> bool {
        self.lock().iter().any(|s| s.name == name)
    }

    /// Get a span by name (returns the last occurrence).
    pub fn get_span(&self, name: &str) -> Option<CapturedSpan> {
        self.lock().iter().rev().find(|s| s.name == name).cloned()
    }

    /// Get field value from the last span named `span_name`.
    pub fn get_field(&self, span_name: &str, field_name: &str) -> Option<String> {
        self.get_span(span_name)
            .and_then(|s| s.field(field_name).map(String::from))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
