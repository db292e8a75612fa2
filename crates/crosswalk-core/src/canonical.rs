//! Canonical entities and identity correlations
//!
//! A canonical entity is the system-neutral form of a record. An identity
//! correlation links one canonical id to the native identifiers the record has
//! in the source and destination systems.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::event::SourceSystem;

/// Globally unique canonical identifier (128-bit random UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(Uuid);

impl CanonicalId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CanonicalId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CanonicalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Normalized representation of one entity, independent of either system's schema.
///
/// `attributes` holds the entity-specific normalized fields as a JSON object.
/// Created once at the first successful forward; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub canonical_id: CanonicalId,
    pub entity_type: String,
    pub attributes: Value,
    pub created_at: DateTime<Utc>,
}

impl CanonicalEntity {
    pub fn new(canonical_id: CanonicalId, entity_type: impl Into<String>, attributes: Value) -> Self {
        Self {
            canonical_id,
            entity_type: entity_type.into(),
            attributes,
            created_at: Utc::now(),
        }
    }

    /// Read a string attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// Durable link between a canonical id and the native ids in each system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCorrelation {
    pub canonical_id: CanonicalId,
    pub entity_type: String,
    /// System that originated the entity
    pub source_system: SourceSystem,
    /// Identifier assigned by the originating system
    pub source_id: String,
    /// Identifier assigned by the destination system, once acknowledged
    pub destination_id: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl IdentityCorrelation {
    /// Correlation known only on the source side.
    pub fn pending(
        canonical_id: CanonicalId,
        entity_type: impl Into<String>,
        source_system: SourceSystem,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            canonical_id,
            entity_type: entity_type.into(),
            source_system,
            source_id: source_id.into(),
            destination_id: None,
            last_updated: Utc::now(),
        }
    }

    /// Attach the destination identifier (builder pattern).
    pub fn with_destination(mut self, destination_id: impl Into<String>) -> Self {
        self.destination_id = Some(destination_id.into());
        self.last_updated = Utc::now();
        self
    }

    /// Only the source id is known.
    pub fn is_for_creation(&self) -> bool {
        !self.source_id.is_empty() && !self.has_destination()
    }

    /// Both ids are known.
    pub fn is_complete(&self) -> bool {
        !self.source_id.is_empty() && self.has_destination()
    }

    fn has_destination(&self) -> bool {
        self.destination_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Synchronization state of a source record, derived from its correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No correlation exists yet. A normal state, not an error.
    NotSynchronized,
    Pending,
    Complete,
}

impl SyncStatus {
    pub fn from_correlations(correlations: &[IdentityCorrelation]) -> Self {
        if correlations.iter().any(IdentityCorrelation::is_complete) {
            Self::Complete
        } else if correlations.is_empty() {
            Self::NotSynchronized
        } else {
            Self::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSynchronized => "not yet synchronized",
            Self::Pending => "pending",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the `id` field of a JSON object as a string (numbers are stringified).
pub(crate) fn extract_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
