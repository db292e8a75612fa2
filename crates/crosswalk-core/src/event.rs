//! Change-event envelope and decoder
//!
//! Upstream systems publish one JSON envelope per change:
//!
//! ```text
//! {"entity": "Student", "operation": "CREATE", "source": "ACADEMIC",
//!  "data": "{\"id\": 1, \"full_name\": \"...\"}", "timestamp": "2024-01-01T10:00:00"}
//! ```
//!
//! Decoding validates the envelope only. `operation` and `source` must map to a
//! known enumerant (case-insensitive); the payload is kept as opaque JSON and is
//! checked later by the entity translator.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::canonical::extract_id;

/// Errors raised while decoding an inbound envelope.
///
/// A decode failure is fatal for that single event. Nothing is retried and no
/// state is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed envelope: {0}")]
    Malformed(String),

    #[error("Missing envelope field: {0}")]
    MissingField(&'static str),

    #[error("Empty entity name")]
    EmptyEntity,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unknown source system: {0}")]
    UnknownSource(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// CRUD operation carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(DecodeError::UnknownOperation(s.to_string())),
        }
    }
}

/// Upstream system that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceSystem {
    /// Academic management system (system of record for students)
    #[serde(alias = "ORM", alias = "orm", alias = "academic")]
    Academic,
    /// Library system
    #[serde(alias = "ODM", alias = "odm", alias = "library")]
    Library,
}

impl SourceSystem {
    /// Canonical wire name of the system.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "ACADEMIC",
            Self::Library => "LIBRARY",
        }
    }
}

impl fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSystem {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACADEMIC" | "ORM" | "SYSTEM_A" => Ok(Self::Academic),
            "LIBRARY" | "ODM" | "SYSTEM_B" => Ok(Self::Library),
            _ => Err(DecodeError::UnknownSource(s.to_string())),
        }
    }
}

/// A decoded change event.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// Logical entity type name, as published (e.g. "Student")
    pub entity: String,
    pub operation: Operation,
    pub source: SourceSystem,
    /// Entity state as known to the source system
    pub payload: Value,
    /// Event production time
    pub timestamp: DateTime<Utc>,
}

/// Envelope as it appears on the wire, before validation.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    entity: Option<String>,
    operation: Option<String>,
    source: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Envelope written by [`ChangeEvent::to_wire`]
#[derive(Debug, Serialize)]
struct WireEnvelope<'a> {
    entity: &'a str,
    operation: Operation,
    source: SourceSystem,
    data: String,
    timestamp: String,
}

impl ChangeEvent {
    /// Create an event stamped with the current time.
    pub fn new(
        entity: impl Into<String>,
        operation: Operation,
        source: SourceSystem,
        payload: Value,
    ) -> Self {
        Self {
            entity: entity.into(),
            operation,
            source,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Override the production timestamp (builder pattern).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Decode an envelope from its JSON text.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let envelope: RawEnvelope =
            serde_json::from_str(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let entity = envelope.entity.ok_or(DecodeError::MissingField("entity"))?;
        let entity = entity.trim().to_string();
        if entity.is_empty() {
            return Err(DecodeError::EmptyEntity);
        }

        let operation: Operation = envelope
            .operation
            .ok_or(DecodeError::MissingField("operation"))?
            .parse()?;
        let source: SourceSystem = envelope
            .source
            .ok_or(DecodeError::MissingField("source"))?
            .parse()?;

        let payload = decode_payload(envelope.data)?;
        let timestamp = match envelope.timestamp {
            Some(ts) if !ts.trim().is_empty() => parse_timestamp(&ts)?,
            _ => Utc::now(),
        };

        Ok(Self {
            entity,
            operation,
            source,
            payload,
            timestamp,
        })
    }

    /// Decode an envelope from raw message bytes.
    pub fn decode_bytes(raw: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| DecodeError::Malformed(format!("envelope is not UTF-8: {}", e)))?;
        Self::decode(text)
    }

    /// Encode the event in the publisher wire format (payload as a JSON string).
    pub fn to_wire(&self) -> String {
        let envelope = WireEnvelope {
            entity: &self.entity,
            operation: self.operation,
            source: self.source,
            data: self.payload.to_string(),
            timestamp: self.timestamp.to_rfc3339(),
        };
        // Serializing a struct of strings and unit enums cannot fail
        serde_json::to_string(&envelope).unwrap_or_default()
    }

    /// Identifier assigned by the originating system (`payload.id`).
    pub fn source_id(&self) -> Option<String> {
        extract_id(&self.payload)
    }
}

/// `data` is either a JSON document encoded as a string or an inline value.
fn decode_payload(data: Option<Value>) -> Result<Value, DecodeError> {
    match data {
        None | Some(Value::Null) => Ok(Value::Null),
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(|e| DecodeError::InvalidPayload(e.to_string()))
        }
        Some(value) => Ok(value),
    }
}

/// Accept RFC 3339 or a naive ISO-8601 timestamp (taken as UTC).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DecodeError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(DecodeError::InvalidTimestamp(raw.to_string()))
}
