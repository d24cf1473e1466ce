//! CloudEvents JSON encoding

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

use super::envelope::{EnvelopeFields, EventEnvelope, SPEC_VERSION};
use crate::error::{HeraldError, Result};

/// Borrowed view used for encoding
#[derive(Serialize)]
struct WireRef<'a> {
    specversion: &'static str,
    id: &'a str,
    source: &'a str,
    #[serde(rename = "type")]
    event_type: &'a str,
    time: &'a DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datacontenttype: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dataschema: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(flatten)]
    extensions: &'a HashMap<String, Value>,
}

/// Owned shape used for decoding; validation happens afterwards
#[derive(Deserialize)]
struct Wire {
    #[serde(default)]
    specversion: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    datacontenttype: Option<String>,
    #[serde(default)]
    dataschema: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(flatten)]
    extensions: HashMap<String, Value>,
}

impl Wire {
    fn into_fields(self) -> std::result::Result<EnvelopeFields, String> {
        if let Some(version) = &self.specversion {
            if version != SPEC_VERSION {
                return Err(format!("unsupported specversion: {}", version));
            }
        }

        let mut fields = EnvelopeFields::new();
        if let Some(id) = self.id {
            fields.id = id;
        }
        if let Some(time) = self.time {
            fields.time = time;
        }
        fields.source = self.source;
        fields.event_type = self.event_type;
        fields.subject = self.subject;
        fields.data_content_type = self.datacontenttype;
        fields.data_schema = self.dataschema;
        fields.data = self.data;
        fields.extensions = self.extensions;
        Ok(fields)
    }
}

impl Serialize for EventEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireRef {
            specversion: SPEC_VERSION,
            id: self.id(),
            source: self.source(),
            event_type: self.event_type(),
            time: &self.time(),
            subject: self.subject(),
            datacontenttype: self.data_content_type(),
            dataschema: self.data_schema(),
            data: self.data(),
            extensions: self.extensions(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = Wire::deserialize(deserializer)?
            .into_fields()
            .map_err(serde::de::Error::custom)?;
        EventEnvelope::from_fields(fields).map_err(serde::de::Error::custom)
    }
}

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    /// JSON format
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// One-line human readable summary
    Summary,
}

impl std::str::FromStr for EventFormat {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(EventFormat::Json),
            "pretty" | "json-pretty" => Ok(EventFormat::JsonPretty),
            "summary" => Ok(EventFormat::Summary),
            other => Err(HeraldError::Other(format!("Unknown event format: {}", other))),
        }
    }
}

/// Event envelope exporter
pub struct EventExporter;

impl EventExporter {
    /// Export to JSON
    pub fn to_json(event: &EventEnvelope) -> Result<String> {
        Ok(serde_json::to_string(event)?)
    }

    /// Export to pretty JSON
    pub fn to_json_pretty(event: &EventEnvelope) -> Result<String> {
        Ok(serde_json::to_string_pretty(event)?)
    }

    /// Export to a one-line summary
    pub fn to_summary(event: &EventEnvelope) -> String {
        let mut line = format!(
            "{} {} from {} id={}",
            event.time().to_rfc3339_opts(SecondsFormat::Millis, true),
            event.event_type(),
            event.source(),
            event.id()
        );
        if let Some(subject) = event.subject() {
            line.push_str(&format!(" subject={}", subject));
        }
        if !event.extensions().is_empty() {
            let mut names: Vec<&str> = event.extensions().keys().map(String::as_str).collect();
            names.sort_unstable();
            line.push_str(&format!(" ext=[{}]", names.join(",")));
        }
        line
    }

    /// Export in specified format
    pub fn export(event: &EventEnvelope, format: EventFormat) -> Result<String> {
        match format {
            EventFormat::Json => Self::to_json(event),
            EventFormat::JsonPretty => Self::to_json_pretty(event),
            EventFormat::Summary => Ok(Self::to_summary(event)),
        }
    }

    /// Decode a JSON envelope.
    ///
    /// Missing or blank `source`/`type` surface as
    /// [`HeraldError::Validation`] rather than as a parse failure.
    pub fn from_json(json: &str) -> Result<EventEnvelope> {
        let wire: Wire = serde_json::from_str(json)?;
        let fields = wire
            .into_fields()
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        Ok(EventEnvelope::from_fields(fields)?)
    }
}
