//! Lightweight span tracking
//!
//! Brackets logical units of work with start/end markers and attaches
//! diagnostic metadata. Spans are plain identifiers; the tracker stores no
//! per-span state and forwards lifecycle calls to a [`SpanSink`] when export
//! is enabled.
//!
//! # Example
//!
//! ```rust
//! use herald_core::spans::{MemorySink, SpanTracker};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let tracker = SpanTracker::with_sink("calculator", true, true, sink.clone());
//!
//! let span = tracker.create_span("divide");
//! tracker.add_attribute(&span, "divisor", "0");
//! tracker.record_exception(&span, &std::io::Error::other("division by zero"));
//! tracker.end_span(&span);
//!
//! assert_eq!(sink.len(), 4);
//! ```

mod scoped;
mod sink;
mod tracker;

pub use scoped::ScopedSpan;
pub use sink::{LogSink, MemorySink, SpanRecord, SpanSink};
pub use tracker::{DEFAULT_SERVICE_NAME, SpanId, SpanTracker};
