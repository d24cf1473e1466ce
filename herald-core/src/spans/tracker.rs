//! Span lifecycle tracking

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::scoped::ScopedSpan;
use super::sink::{LogSink, SpanSink};
use crate::config::TracingConfig;

/// Service name used when none (or a blank one) is configured
pub const DEFAULT_SERVICE_NAME: &str = "unknown-service";

/// Opaque span identifier.
///
/// The empty identifier means "no span": it is what a disabled tracker hands
/// out, and every tracker operation ignores it. Identifiers are not checked
/// against the ones the tracker issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(String);

impl SpanId {
    /// The "no span" identifier
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Whether this is the empty/blank identifier
    pub fn is_none(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw identifier
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SpanId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SpanId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SpanId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Creates, annotates and ends lightweight trace spans.
///
/// The tracker holds only its configuration and the export sink, so a
/// single instance can be shared freely between threads. Nothing here ever
/// fails: disabled tracing, blank span IDs and stale IDs all degrade to
/// silent no-ops or plain forwarding.
pub struct SpanTracker {
    service_name: String,
    tracing_enabled: bool,
    export_enabled: bool,
    sink: Arc<dyn SpanSink>,
}

impl SpanTracker {
    /// Create a tracker that exports to [`LogSink`]
    pub fn new(service_name: impl Into<String>, tracing_enabled: bool, export_enabled: bool) -> Self {
        Self::with_sink(service_name, tracing_enabled, export_enabled, Arc::new(LogSink))
    }

    /// Create a tracker that exports to the given sink
    pub fn with_sink(
        service_name: impl Into<String>,
        tracing_enabled: bool,
        export_enabled: bool,
        sink: Arc<dyn SpanSink>,
    ) -> Self {
        let service_name = service_name.into();
        let service_name = if service_name.trim().is_empty() {
            DEFAULT_SERVICE_NAME.to_string()
        } else {
            service_name
        };

        if tracing_enabled {
            tracing::info!(service = %service_name, "Tracing enabled");
            if export_enabled {
                tracing::info!(service = %service_name, "Span export enabled");
            }
        }

        Self {
            service_name,
            tracing_enabled,
            export_enabled,
            sink,
        }
    }

    /// Create a tracker from configuration, exporting to [`LogSink`]
    pub fn from_config(config: &TracingConfig) -> Self {
        Self::from_config_with_sink(config, Arc::new(LogSink))
    }

    /// Create a tracker from configuration with the given sink
    pub fn from_config_with_sink(config: &TracingConfig, sink: Arc<dyn SpanSink>) -> Self {
        Self::with_sink(
            config.service_name.clone().unwrap_or_default(),
            config.enabled,
            config.export_enabled,
            sink,
        )
    }

    /// Start a span. Returns [`SpanId::none`] when tracing is disabled.
    pub fn create_span(&self, name: &str) -> SpanId {
        if !self.tracing_enabled {
            return SpanId::none();
        }

        let span_id = SpanId::generate();
        if self.exporting() {
            self.sink
                .record_span_start(&self.service_name, name, span_id.as_str());
        }
        span_id
    }

    /// End a span
    pub fn end_span(&self, span_id: impl AsRef<str>) {
        let span_id = span_id.as_ref();
        if !self.accepts(span_id) {
            return;
        }

        if self.exporting() {
            self.sink.record_span_end(span_id);
        }
    }

    /// Attach a key/value attribute to a span
    pub fn add_attribute(&self, span_id: impl AsRef<str>, key: &str, value: &str) {
        let span_id = span_id.as_ref();
        if !self.accepts(span_id) {
            return;
        }

        if self.exporting() {
            self.sink.record_attribute(span_id, key, value);
        }
    }

    /// Record a failure against a span without ending it
    pub fn record_exception(&self, span_id: impl AsRef<str>, error: &dyn std::error::Error) {
        let span_id = span_id.as_ref();
        if !self.accepts(span_id) {
            return;
        }

        tracing::warn!(span_id = %span_id, error = %error, "Exception in span");

        if self.exporting() {
            self.sink.record_exception(span_id, error);
        }
    }

    /// Start a span that ends when the returned guard is dropped
    pub fn scoped(&self, name: &str) -> ScopedSpan<'_> {
        ScopedSpan::new(self, self.create_span(name))
    }

    /// Service name
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Whether tracing is enabled
    pub fn is_tracing_enabled(&self) -> bool {
        self.tracing_enabled
    }

    /// Whether export was requested (inert while tracing is disabled)
    pub fn is_export_enabled(&self) -> bool {
        self.export_enabled
    }

    fn accepts(&self, span_id: &str) -> bool {
        self.tracing_enabled && !span_id.trim().is_empty()
    }

    fn exporting(&self) -> bool {
        self.tracing_enabled && self.export_enabled
    }
}

impl fmt::Debug for SpanTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanTracker")
            .field("service_name", &self.service_name)
            .field("tracing_enabled", &self.tracing_enabled)
            .field("export_enabled", &self.export_enabled)
            .finish_non_exhaustive()
    }
}
