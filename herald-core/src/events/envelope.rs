//! Event envelope and its builder

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::EventsConfig;
use crate::error::ValidationError;

/// CloudEvents specification version emitted by the JSON format
pub const SPEC_VERSION: &str = "1.0";

/// Attribute names that live at the top level of the JSON shape and
/// therefore cannot be used as extension names.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    "specversion",
    "id",
    "source",
    "type",
    "time",
    "subject",
    "datacontenttype",
    "dataschema",
    "data",
];

/// Immutable record describing something that happened.
///
/// Only obtainable through [`EventEnvelope::from_fields`] (or a builder that
/// calls it), so `source` and `event_type` are always non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    id: String,
    source: String,
    event_type: String,
    time: DateTime<Utc>,
    subject: Option<String>,
    data_content_type: Option<String>,
    data_schema: Option<String>,
    data: Option<Value>,
    extensions: HashMap<String, Value>,
}

/// Raw envelope attributes prior to validation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeFields {
    /// Event ID (a blank ID is replaced with a fresh one)
    pub id: String,
    /// Producer of the event
    pub source: Option<String>,
    /// Event category
    pub event_type: Option<String>,
    /// When the event happened
    pub time: DateTime<Utc>,
    /// Resource the event concerns
    pub subject: Option<String>,
    /// Encoding of `data`
    pub data_content_type: Option<String>,
    /// Schema of `data`
    pub data_schema: Option<String>,
    /// Payload
    pub data: Option<Value>,
    /// Extension attributes
    pub extensions: HashMap<String, Value>,
}

impl EnvelopeFields {
    /// Fresh field set with a generated ID and the current time
    pub fn new() -> Self {
        Self {
            id: generate_event_id(),
            source: None,
            event_type: None,
            time: Utc::now(),
            subject: None,
            data_content_type: None,
            data_schema: None,
            data: None,
            extensions: HashMap::new(),
        }
    }
}

impl Default for EnvelopeFields {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEnvelope {
    /// Create a new envelope builder
    pub fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::new()
    }

    /// Validate `fields` and freeze them into an envelope.
    ///
    /// Checks `source` before `type`, so fields missing both report the
    /// source error.
    pub fn from_fields(fields: EnvelopeFields) -> Result<Self, ValidationError> {
        let source = match fields.source {
            Some(source) if !source.trim().is_empty() => source,
            _ => return Err(ValidationError::MissingSource),
        };
        let event_type = match fields.event_type {
            Some(event_type) if !event_type.trim().is_empty() => event_type,
            _ => return Err(ValidationError::MissingType),
        };

        if let Some(name) = fields
            .extensions
            .keys()
            .find(|name| RESERVED_ATTRIBUTES.contains(&name.as_str()))
        {
            return Err(ValidationError::ReservedExtension(name.clone()));
        }

        let id = if fields.id.trim().is_empty() {
            generate_event_id()
        } else {
            fields.id
        };

        Ok(Self {
            id,
            source,
            event_type,
            time: fields.time,
            subject: fields.subject,
            data_content_type: fields.data_content_type,
            data_schema: fields.data_schema,
            data: fields.data,
            extensions: fields.extensions,
        })
    }

    /// Event ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Event source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Event type
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Event time
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Event subject
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Data content type
    pub fn data_content_type(&self) -> Option<&str> {
        self.data_content_type.as_deref()
    }

    /// Data schema
    pub fn data_schema(&self) -> Option<&str> {
        self.data_schema.as_deref()
    }

    /// Event payload
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// All extension attributes
    pub fn extensions(&self) -> &HashMap<String, Value> {
        &self.extensions
    }

    /// A single extension attribute
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Builder seeded with this envelope's attributes, ID included
    pub fn to_builder(&self) -> EnvelopeBuilder {
        EnvelopeBuilder {
            fields: EnvelopeFields {
                id: self.id.clone(),
                source: Some(self.source.clone()),
                event_type: Some(self.event_type.clone()),
                time: self.time,
                subject: self.subject.clone(),
                data_content_type: self.data_content_type.clone(),
                data_schema: self.data_schema.clone(),
                data: self.data.clone(),
                extensions: self.extensions.clone(),
            },
        }
    }
}

/// Builder for [`EventEnvelope`].
///
/// `build` borrows the builder, so one builder can produce several
/// envelopes. Each envelope owns a copy of the extensions present at the
/// time it was built.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuilder {
    fields: EnvelopeFields,
}

impl EnvelopeBuilder {
    /// Create a builder with a fresh ID and the current time
    pub fn new() -> Self {
        Self {
            fields: EnvelopeFields::new(),
        }
    }

    /// Create a builder pre-filled with configured defaults
    pub fn from_config(config: &EventsConfig) -> Self {
        let mut builder = Self::new();
        builder.fields.source = config.default_source.clone();
        builder.fields.data_content_type = config.default_data_content_type.clone();
        builder
    }

    /// Set the event ID
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.fields.id = id.into();
        self
    }

    /// Set the event source
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.fields.source = Some(source.into());
        self
    }

    /// Set the event type
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.fields.event_type = Some(event_type.into());
        self
    }

    /// Set the event time
    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.fields.time = time;
        self
    }

    /// Set the event subject
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.fields.subject = Some(subject.into());
        self
    }

    /// Set the data content type
    pub fn data_content_type(mut self, data_content_type: impl Into<String>) -> Self {
        self.fields.data_content_type = Some(data_content_type.into());
        self
    }

    /// Set the data schema
    pub fn data_schema(mut self, data_schema: impl Into<String>) -> Self {
        self.fields.data_schema = Some(data_schema.into());
        self
    }

    /// Set the event payload
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.fields.data = Some(data.into());
        self
    }

    /// Add an extension attribute, replacing any previous value
    pub fn extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.extensions.insert(name.into(), value.into());
        self
    }

    /// Current field values
    pub fn fields(&self) -> &EnvelopeFields {
        &self.fields
    }

    /// Mutable access to the field values
    pub fn fields_mut(&mut self) -> &mut EnvelopeFields {
        &mut self.fields
    }

    /// Validate and build an envelope
    pub fn build(&self) -> Result<EventEnvelope, ValidationError> {
        EventEnvelope::from_fields(self.fields.clone())
    }
}

impl From<EnvelopeFields> for EnvelopeBuilder {
    fn from(fields: EnvelopeFields) -> Self {
        Self { fields }
    }
}

impl TryFrom<EnvelopeFields> for EventEnvelope {
    type Error = ValidationError;

    fn try_from(fields: EnvelopeFields) -> Result<Self, Self::Error> {
        Self::from_fields(fields)
    }
}

fn generate_event_id() -> String {
    Uuid::new_v4().to_string()
}
