//! Entity translators
//!
//! A translator maps one entity type's source-system payload to the
//! destination-system representation and to its canonical representation.
//! Translators are pure: no I/O and no shared mutable state.

mod student;

pub use student::{
    map_loan_status, EnrollmentStatus, StudentRecord, StudentTranslator,
    DEFAULT_ENROLLMENT_STATUS, STUDENT_ENTITY,
};

use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::canonical::{CanonicalEntity, CanonicalId};

/// Errors from canonical mapping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Payload for {entity} is not a JSON object")]
    NotAnObject { entity: String },

    #[error("Payload for {entity} is missing required field '{field}'")]
    MissingField { entity: String, field: &'static str },
}

/// Capability bundle for one entity type.
pub trait EntityTranslator: Send + Sync + fmt::Debug {
    /// Entity type name this translator handles (e.g. "Student")
    fn entity_type(&self) -> &str;

    /// Map a source payload to the destination representation.
    ///
    /// `None` means translation cannot proceed; the event is skipped.
    fn to_destination(&self, payload: &Value) -> Option<Value>;

    /// Map a source payload to its canonical record.
    ///
    /// A fresh identifier is generated when `canonical_id` is `None`.
    fn to_canonical(
        &self,
        payload: &Value,
        canonical_id: Option<CanonicalId>,
    ) -> Result<CanonicalEntity, TranslationError>;
}

/// Split a full name on the first run of whitespace.
///
/// Returns `(first, remainder)`; the remainder is trimmed and empty when the
/// name has a single word. Missing or blank names give two empty strings.
pub fn split_full_name<'a>(full_name: impl Into<Option<&'a str>>) -> (String, String) {
    let Some(name) = full_name.into() else {
        return (String::new(), String::new());
    };

    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Read a scalar field as text. Numbers are stringified.
pub(crate) fn text_field(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
