//! Student translator
//!
//! Academic-system students become library-system users:
//!
//! ```text
//! {"id": 1, "full_name": "Pedro Santos Oliveira", "status_loans": "SETTLED"}
//!   -> {"first_name": "Pedro", "last_name": "Santos Oliveira", "enrollment_status": "ACTIVE"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{split_full_name, text_field, EntityTranslator, TranslationError};
use crate::canonical::{CanonicalEntity, CanonicalId};

/// Registry name of the student entity
pub const STUDENT_ENTITY: &str = "Student";

/// Enrollment status in the destination vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    Active,
    Inactive,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

/// Used for missing or unrecognized loan statuses.
pub const DEFAULT_ENROLLMENT_STATUS: EnrollmentStatus = EnrollmentStatus::Active;

/// Loan status (source vocabulary) to enrollment status. Matched case-insensitively.
const LOAN_STATUS_TABLE: &[(&str, EnrollmentStatus)] = &[
    ("SETTLED", EnrollmentStatus::Active),
    ("OUTSTANDING", EnrollmentStatus::Inactive),
    // Legacy vocabulary still emitted by older publishers
    ("QUITADO", EnrollmentStatus::Active),
    ("EM_ABERTO", EnrollmentStatus::Inactive),
];

/// Map a loan status to an enrollment status. Total: never fails.
pub fn map_loan_status(status: Option<&str>) -> EnrollmentStatus {
    let Some(raw) = status.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_ENROLLMENT_STATUS;
    };

    let upper = raw.to_ascii_uppercase();
    match LOAN_STATUS_TABLE.iter().find(|(key, _)| *key == upper) {
        Some((_, mapped)) => *mapped,
        None => {
            warn!(
                status = raw,
                default = DEFAULT_ENROLLMENT_STATUS.as_str(),
                "Unknown loan status, using default enrollment status"
            );
            DEFAULT_ENROLLMENT_STATUS
        }
    }
}

/// Canonical student attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub birth_date: String,
    pub enrollment_number: String,
    pub academic_status: EnrollmentStatus,
    /// Loan status exactly as reported by the source
    pub library_status: String,
}

impl StudentRecord {
    fn from_payload(payload: &Value) -> Self {
        let full_name = text_field(payload, "full_name").unwrap_or_default();
        let (first_name, last_name) = split_full_name(full_name.as_str());
        let loan_status = text_field(payload, "status_loans");

        Self {
            first_name,
            last_name,
            academic_status: map_loan_status(loan_status.as_deref()),
            library_status: loan_status.unwrap_or_else(|| "SETTLED".to_string()),
            birth_date: text_field(payload, "birth_date").unwrap_or_default(),
            enrollment_number: text_field(payload, "enrollment").unwrap_or_default(),
            full_name,
        }
    }
}

/// Translator for the `Student` entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentTranslator;

impl StudentTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl EntityTranslator for StudentTranslator {
    fn entity_type(&self) -> &str {
        STUDENT_ENTITY
    }

    fn to_destination(&self, payload: &Value) -> Option<Value> {
        if !payload.is_object() {
            debug!("Student payload is not a JSON object");
            return None;
        }

        // A missing name still forwards, with both name segments empty
        let full_name = text_field(payload, "full_name").unwrap_or_default();
        let (first_name, last_name) = split_full_name(full_name.as_str());
        let status = map_loan_status(text_field(payload, "status_loans").as_deref());

        debug!(
            full_name = %full_name,
            first_name = %first_name,
            last_name = %last_name,
            status = status.as_str(),
            "Translated student"
        );

        Some(json!({
            "first_name": first_name,
            "last_name": last_name,
            "enrollment_status": status.as_str(),
        }))
    }

    fn to_canonical(
        &self,
        payload: &Value,
        canonical_id: Option<CanonicalId>,
    ) -> Result<CanonicalEntity, TranslationError> {
        if !payload.is_object() {
            return Err(TranslationError::NotAnObject {
                entity: STUDENT_ENTITY.to_string(),
            });
        }

        let record = StudentRecord::from_payload(payload);
        let attributes = serde_json::to_value(&record).map_err(|_| TranslationError::NotAnObject {
            entity: STUDENT_ENTITY.to_string(),
        })?;

        Ok(CanonicalEntity::new(
            canonical_id.unwrap_or_else(CanonicalId::generate),
            STUDENT_ENTITY,
            attributes,
        ))
    }
}
