//! Correlation recorder
//!
//! Runs after a completed dispatch. Every failure here is contained: it is
//! logged and reported as [`CorrelationOutcome::Abandoned`], never returned
//! as an error, so a forward that already happened stays successful.

use crosswalk_core::{
    CanonicalId, ChangeEvent, CorrelationStore, DispatchResponse, ForwardPlan,
    IdentityCorrelation, StorageError, TranslationError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why no correlation was recorded
#[derive(Error, Debug, Clone)]
pub enum CorrelationError {
    #[error("destination response carried no usable id (status {status})")]
    MissingDestinationId { status: u16 },

    #[error("source payload carried no usable id")]
    MissingSourceId,

    #[error("canonical mapping failed: {0}")]
    Translation(#[from] TranslationError),

    #[error("storage write failed: {0}")]
    Storage(#[from] StorageError),
}

/// Result of the bookkeeping step
#[derive(Debug, Clone)]
pub enum CorrelationOutcome {
    Recorded {
        canonical_id: CanonicalId,
        source_id: String,
        destination_id: String,
    },
    Abandoned(CorrelationError),
}

impl CorrelationOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }

    pub fn canonical_id(&self) -> Option<CanonicalId> {
        match self {
            Self::Recorded { canonical_id, .. } => Some(*canonical_id),
            Self::Abandoned(_) => None,
        }
    }
}

/// Writes canonical entities and identity correlations for forwarded events.
#[derive(Clone)]
pub struct CorrelationRecorder {
    store: Arc<dyn CorrelationStore>,
}

impl CorrelationRecorder {
    pub fn new(store: Arc<dyn CorrelationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CorrelationStore> {
        &self.store
    }

    /// Record the correlation for one forwarded event.
    pub async fn record(
        &self,
        event: &ChangeEvent,
        plan: &ForwardPlan,
        response: &DispatchResponse,
    ) -> CorrelationOutcome {
        match self.try_record(event, plan, response).await {
            Ok(outcome) => outcome,
            Err(err) => {
                match &err {
                    CorrelationError::MissingDestinationId { .. }
                    | CorrelationError::MissingSourceId => {
                        warn!(entity = %event.entity, error = %err, "Correlation not recorded");
                    }
                    CorrelationError::Translation(_) | CorrelationError::Storage(_) => {
                        error!(
                            entity = %event.entity,
                            error = %err,
                            "Failed to record correlation; forward stands"
                        );
                    }
                }
                CorrelationOutcome::Abandoned(err)
            }
        }
    }

    async fn try_record(
        &self,
        event: &ChangeEvent,
        plan: &ForwardPlan,
        response: &DispatchResponse,
    ) -> Result<CorrelationOutcome, CorrelationError> {
        let destination_id = response
            .destination_id()
            .ok_or(CorrelationError::MissingDestinationId {
                status: response.status,
            })?;
        let source_id = event.source_id().ok_or(CorrelationError::MissingSourceId)?;

        let canonical_id = CanonicalId::generate();
        let canonical = plan
            .translator
            .to_canonical(&event.payload, Some(canonical_id))?;
        let correlation = IdentityCorrelation::pending(
            canonical_id,
            canonical.entity_type.clone(),
            event.source,
            source_id.clone(),
        )
        .with_destination(destination_id.clone());

        self.store.record(&canonical, &correlation).await?;

        info!(
            entity = %canonical.entity_type,
            canonical_id = %canonical_id,
            source_id = %source_id,
            destination_id = %destination_id,
            "Correlation recorded"
        );

        Ok(CorrelationOutcome::Recorded {
            canonical_id,
            source_id,
            destination_id,
        })
    }
}
