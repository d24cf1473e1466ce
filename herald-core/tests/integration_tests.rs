//! Integration tests for envelopes, span tracking and configuration

use herald_core::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Sink that records raw call arguments, as a backend adapter would see them
#[derive(Default)]
struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SpanSink for CallLog {
    fn record_span_start(&self, service_name: &str, span_name: &str, span_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("start {} {} {}", service_name, span_name, span_id));
    }

    fn record_span_end(&self, span_id: &str) {
        self.calls.lock().unwrap().push(format!("end {}", span_id));
    }

    fn record_attribute(&self, span_id: &str, key: &str, value: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("attr {} {}={}", span_id, key, value));
    }

    fn record_exception(&self, span_id: &str, error: &dyn std::error::Error) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("exception {} {}", span_id, error));
    }
}

#[test]
fn test_envelope_scenario() {
    let before = chrono::Utc::now();
    let event = EventEnvelope::builder()
        .source("svc")
        .event_type("evt.created")
        .build()
        .expect("valid envelope");
    let after = chrono::Utc::now();

    assert!(!event.id().is_empty());
    assert_eq!(event.source(), "svc");
    assert_eq!(event.event_type(), "evt.created");
    assert!(event.time() >= before && event.time() <= after);
}

#[test]
fn test_valid_pairs_round_trip_exactly() {
    let pairs = [
        ("svc", "evt.created"),
        ("https://example.com/events", "com.example.event.created"),
        ("  padded  ", "type with spaces"),
        ("ünïcode", "événement"),
    ];

    for (source, event_type) in pairs {
        let event = EventEnvelope::builder()
            .source(source)
            .event_type(event_type)
            .build()
            .unwrap();
        assert_eq!(event.source(), source);
        assert_eq!(event.event_type(), event_type);
    }
}

#[test]
fn test_validation_errors_surface_through_crate_error() {
    fn build(builder: EnvelopeBuilder) -> Result<EventEnvelope> {
        Ok(builder.build()?)
    }

    let err = build(EventEnvelope::builder().event_type("evt")).unwrap_err();
    assert_eq!(err.to_string(), "source is required");

    let err = build(EventEnvelope::builder().source("svc")).unwrap_err();
    assert_eq!(err.to_string(), "type is required");
}

#[test]
fn test_many_generated_ids_are_distinct() {
    let ids: HashSet<String> = (0..500)
        .map(|_| {
            EventEnvelope::builder()
                .source("svc")
                .event_type("evt")
                .build()
                .unwrap()
                .id()
                .to_string()
        })
        .collect();

    assert_eq!(ids.len(), 500);
}

#[test]
fn test_envelope_shared_across_threads() {
    let event = Arc::new(
        EventEnvelope::builder()
            .source("svc")
            .event_type("evt")
            .data(json!({"n": 1}))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let event = event.clone();
            std::thread::spawn(move || EventExporter::to_json(&event).unwrap())
        })
        .collect();

    let outputs: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs.len(), 1);
}

#[test]
fn test_json_decode_of_external_event() {
    let json = r#"{
        "specversion": "1.0",
        "id": "A234-1234-1234",
        "source": "https://github.com/cloudevents/spec/pull",
        "type": "com.github.pull_request.opened",
        "subject": "123",
        "time": "2018-04-05T17:31:00Z",
        "comexampleextension1": "value",
        "comexampleothervalue": 5,
        "datacontenttype": "text/xml",
        "data": "<much wow=\"xml\"/>"
    }"#;

    let event = EventExporter::from_json(json).unwrap();
    assert_eq!(event.id(), "A234-1234-1234");
    assert_eq!(event.subject(), Some("123"));
    assert_eq!(event.data_content_type(), Some("text/xml"));
    assert_eq!(event.data(), Some(&json!("<much wow=\"xml\"/>")));
    assert_eq!(event.extension("comexampleothervalue"), Some(&json!(5)));
    assert_eq!(event.extensions().len(), 2);
}

#[test]
fn test_tracker_calls_injected_sink_with_arguments() {
    let sink = Arc::new(CallLog::default());
    let tracker = SpanTracker::with_sink("orders", true, true, sink.clone());

    let span = tracker.create_span("checkout");
    tracker.add_attribute(&span, "items", "3");
    tracker.record_exception(&span, &std::io::Error::other("card declined"));
    tracker.end_span(&span);

    assert_eq!(
        sink.calls(),
        vec![
            format!("start orders checkout {}", span),
            format!("attr {} items=3", span),
            format!("exception {} card declined", span),
            format!("end {}", span),
        ]
    );
}

#[test]
fn test_tracker_matrix_without_export() {
    for (enabled, export) in [(false, false), (false, true), (true, false)] {
        let sink = Arc::new(CallLog::default());
        let tracker = SpanTracker::with_sink("svc", enabled, export, sink.clone());

        let span = tracker.create_span("x");
        assert_eq!(span.is_none(), !enabled);
        tracker.add_attribute(&span, "k", "v");
        tracker.record_exception(&span, &std::io::Error::other("boom"));
        tracker.end_span(&span);

        assert!(sink.calls().is_empty());
    }
}

#[test]
fn test_blank_service_name_with_export() {
    let sink = Arc::new(CallLog::default());
    let tracker = SpanTracker::with_sink("   ", true, true, sink.clone());

    let span = tracker.create_span("boot");
    assert_eq!(sink.calls(), vec![format!("start unknown-service boot {}", span)]);
}

#[test]
fn test_config_file_drives_tracker_and_builder() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[tracing]
service_name = "billing"
enabled = true
export_enabled = true

[events]
default_source = "billing"
default_data_content_type = "application/json"
"#
    )
    .unwrap();

    let config = HeraldConfig::from_file(file.path()).unwrap();

    let sink = Arc::new(MemorySink::new());
    let tracker = SpanTracker::from_config_with_sink(&config.tracing, sink.clone());
    {
        let span = tracker.scoped("invoice");
        span.add_attribute("amount", "10.00");
    }
    assert_eq!(sink.len(), 3);
    assert!(matches!(
        &sink.records()[0],
        SpanRecord::Start { service, .. } if service == "billing"
    ));

    let event = EnvelopeBuilder::from_config(&config.events)
        .event_type("invoice.issued")
        .build()
        .unwrap();
    assert_eq!(event.source(), "billing");
    assert_eq!(event.data_content_type(), Some("application/json"));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = HeraldConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, HeraldError::Configuration(_)));
}

#[test]
fn test_malformed_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[tracing]\nenabled = \"not a bool\"").unwrap();

    let err = HeraldConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
