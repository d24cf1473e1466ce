//! Span export sinks

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Destination for span lifecycle records.
///
/// Implemented by adapters for concrete tracing backends. The tracker only
/// calls a sink when both tracing and export are enabled, and calls it once
/// per lifecycle operation.
pub trait SpanSink: Send + Sync {
    /// A span was created
    fn record_span_start(&self, service_name: &str, span_name: &str, span_id: &str);

    /// A span was ended
    fn record_span_end(&self, span_id: &str);

    /// An attribute was attached to a span
    fn record_attribute(&self, span_id: &str, key: &str, value: &str);

    /// A failure was recorded against a span
    fn record_exception(&self, span_id: &str, error: &dyn std::error::Error);
}

/// A single exported lifecycle record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpanRecord {
    /// Span created
    Start {
        service: String,
        name: String,
        span_id: String,
    },
    /// Span ended
    End { span_id: String },
    /// Attribute attached
    Attribute {
        span_id: String,
        key: String,
        value: String,
    },
    /// Failure recorded
    Exception {
        span_id: String,
        message: String,
        /// Messages of the error's `source()` chain, outermost first
        causes: Vec<String>,
    },
}

impl SpanRecord {
    /// ID of the span this record refers to
    pub fn span_id(&self) -> &str {
        match self {
            SpanRecord::Start { span_id, .. }
            | SpanRecord::End { span_id }
            | SpanRecord::Attribute { span_id, .. }
            | SpanRecord::Exception { span_id, .. } => span_id,
        }
    }

    /// Build an exception record from an error and its source chain
    pub fn exception(span_id: &str, error: &dyn std::error::Error) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        SpanRecord::Exception {
            span_id: span_id.to_string(),
            message: error.to_string(),
            causes,
        }
    }
}

/// Sink that writes every record as a `tracing` event.
///
/// Stand-in for a real backend exporter; it is what the tracker uses when
/// export is enabled and no sink was injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl SpanSink for LogSink {
    fn record_span_start(&self, service_name: &str, span_name: &str, span_id: &str) {
        tracing::info!(
            target: "herald::spans",
            service = %service_name,
            span_name = %span_name,
            span_id = %span_id,
            "Created span"
        );
    }

    fn record_span_end(&self, span_id: &str) {
        tracing::info!(target: "herald::spans", span_id = %span_id, "Ended span");
    }

    fn record_attribute(&self, span_id: &str, key: &str, value: &str) {
        tracing::debug!(
            target: "herald::spans",
            span_id = %span_id,
            key = %key,
            value = %value,
            "Added span attribute"
        );
    }

    fn record_exception(&self, span_id: &str, error: &dyn std::error::Error) {
        tracing::warn!(
            target: "herald::spans",
            span_id = %span_id,
            error = %error,
            "Recorded exception in span"
        );
    }
}

/// Sink that keeps records in memory, in call order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<SpanRecord>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<SpanRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, record: SpanRecord) {
        self.lock().push(record);
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<SpanRecord> {
        self.lock().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no record has been captured
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all captured records
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Export captured records as a JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.lock())
    }

    /// Export captured records as a pretty-printed JSON array
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&*self.lock())
    }
}

impl SpanSink for MemorySink {
    fn record_span_start(&self, service_name: &str, span_name: &str, span_id: &str) {
        self.push(SpanRecord::Start {
            service: service_name.to_string(),
            name: span_name.to_string(),
            span_id: span_id.to_string(),
        });
    }

    fn record_span_end(&self, span_id: &str) {
        self.push(SpanRecord::End {
            span_id: span_id.to_string(),
        });
    }

    fn record_attribute(&self, span_id: &str, key: &str, value: &str) {
        self.push(SpanRecord::Attribute {
            span_id: span_id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn record_exception(&self, span_id: &str, error: &dyn std::error::Error) {
        self.push(SpanRecord::exception(span_id, error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("request failed")]
    struct Outer {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.record_span_start("svc", "load", "s1");
        sink.record_attribute("s1", "rows", "42");
        sink.record_span_end("s1");

        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0], SpanRecord::Start { ref name, .. } if name == "load"));
        assert_eq!(
            records[1],
            SpanRecord::Attribute {
                span_id: "s1".into(),
                key: "rows".into(),
                value: "42".into(),
            }
        );
        assert_eq!(records[2], SpanRecord::End { span_id: "s1".into() });
    }

    #[test]
    fn test_exception_captures_source_chain() {
        let error = Outer {
            source: std::io::Error::other("connection reset"),
        };

        let record = SpanRecord::exception("s1", &error);
        assert_eq!(
            record,
            SpanRecord::Exception {
                span_id: "s1".into(),
                message: "request failed".into(),
                causes: vec!["connection reset".into()],
            }
        );
        assert_eq!(record.span_id(), "s1");
    }

    #[test]
    fn test_clear_and_is_empty() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.record_span_end("s1");
        assert_eq!(sink.len(), 1);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_to_json_is_tagged() {
        let sink = MemorySink::new();
        sink.record_span_start("svc", "load", "s1");

        let value: serde_json::Value = serde_json::from_str(&sink.to_json().unwrap()).unwrap();
        assert_eq!(value[0]["kind"], "start");
        assert_eq!(value[0]["service"], "svc");
        assert_eq!(value[0]["span_id"], "s1");
    }

    #[test]
    fn test_log_sink_does_not_panic() {
        let sink = LogSink;
        sink.record_span_start("svc", "load", "s1");
        sink.record_attribute("s1", "k", "v");
        sink.record_exception("s1", &std::io::Error::other("boom"));
        sink.record_span_end("s1");
    }
}
