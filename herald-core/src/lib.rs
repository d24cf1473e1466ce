//! # Herald - event envelopes and span tracking
//!
//! Herald is a small in-process eventing and observability core:
//! - Immutable, validated event envelopes following the CloudEvents
//!   attribute model, with a CloudEvents JSON encoding
//! - A span tracker that brackets units of work with start/end markers,
//!   attaches attributes and failures, and forwards them to a pluggable sink
//!
//! The two halves are independent. Transport, persistence and real tracing
//! backends are left to whoever implements [`spans::SpanSink`] or consumes
//! the encoded envelopes.
//!
//! ## Quick Start
//!
//! ```rust
//! use herald_core::prelude::*;
//!
//! let tracker = SpanTracker::new("calculator", true, false);
//! let span = tracker.create_span("add");
//!
//! let event = EventEnvelope::builder()
//!     .source("calculator")
//!     .event_type("calculation.completed")
//!     .extension("spanid", span.as_str())
//!     .build()?;
//!
//! tracker.end_span(&span);
//! assert_eq!(event.source(), "calculator");
//! # Ok::<(), HeraldError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod spans;

#[cfg(test)]
pub(crate) mod testing;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        ConfigBuilder, EventsConfig, HeraldConfig, LogFormat, LoggingConfig, TracingConfig,
    };
    pub use crate::error::{HeraldError, Result, ValidationError};
    pub use crate::events::{EnvelopeBuilder, EnvelopeFields, EventEnvelope, EventExporter, EventFormat};
    pub use crate::spans::{
        LogSink, MemorySink, ScopedSpan, SpanId, SpanRecord, SpanSink, SpanTracker,
    };
}
