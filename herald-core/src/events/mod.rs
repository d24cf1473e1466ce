//! CloudEvents-style event envelopes
//!
//! An [`EventEnvelope`] describes a discrete occurrence: who produced it
//! (`source`), what kind of occurrence it is (`type`), when it happened, and
//! an optional payload plus free-form extension attributes.
//!
//! # Example
//!
//! ```rust
//! use herald_core::events::{EventEnvelope, EventExporter};
//! use serde_json::json;
//!
//! let event = EventEnvelope::builder()
//!     .source("advanced-calculator")
//!     .event_type("calculation.completed")
//!     .subject("addition")
//!     .data(json!({"operation": "add", "result": 12}))
//!     .build()?;
//!
//! let json = EventExporter::to_json(&event)?;
//! assert!(json.contains("\"type\":\"calculation.completed\""));
//! # Ok::<(), herald_core::error::HeraldError>(())
//! ```

mod envelope;
mod format;

pub use envelope::{EnvelopeBuilder, EnvelopeFields, EventEnvelope, RESERVED_ATTRIBUTES, SPEC_VERSION};
pub use format::{EventExporter, EventFormat};
