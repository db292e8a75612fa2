//! Event pipeline orchestrator
//!
//! One raw envelope goes through a strict sequence:
//!
//! ```text
//! decode -> route -> (skip | dispatch -> record correlation)
//! ```
//!
//! Decode and transport failures are errors for that event only. Skips are
//! ordinary outcomes. Once the dispatch completes the event is successful,
//! whatever happens while recording the correlation.

use crosswalk_core::{
    ChangeEvent, CorrelationStore, DecodeError, DispatchError, DispatchResponse, Dispatcher,
    Router, RoutingDecision,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::recorder::{CorrelationOutcome, CorrelationRecorder};

/// Failures that end processing of a single event
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to decode event: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to dispatch {entity} to {address}: {source}")]
    Dispatch {
        entity: String,
        address: String,
        #[source]
        source: DispatchError,
    },
}

/// What happened to one event
#[derive(Debug, Clone)]
pub enum ProcessingOutcome {
    /// Routing declined to forward the event
    Skipped { decision: RoutingDecision },
    /// The destination answered (any status)
    Forwarded {
        decision: RoutingDecision,
        response: DispatchResponse,
        correlation: CorrelationOutcome,
    },
}

impl ProcessingOutcome {
    pub fn decision(&self) -> &RoutingDecision {
        match self {
            Self::Skipped { decision } | Self::Forwarded { decision, .. } => decision,
        }
    }

    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Forwarded { .. })
    }

    pub fn correlation(&self) -> Option<&CorrelationOutcome> {
        match self {
            Self::Forwarded { correlation, .. } => Some(correlation),
            Self::Skipped { .. } => None,
        }
    }
}

/// The pipeline orchestrator
///
/// All collaborators are injected; the pipeline itself holds no mutable
/// state and is cheap to clone into concurrent tasks.
///
/// ```text
/// EventPipeline
///   ├─> Router (registry lookup + translation)
///   ├─> Dispatcher (destination call)
///   └─> CorrelationRecorder -> CorrelationStore
/// ```
#[derive(Clone)]
pub struct EventPipeline {
    router: Arc<Router>,
    dispatcher: Arc<dyn Dispatcher>,
    recorder: CorrelationRecorder,
}

impl EventPipeline {
    pub fn new(
        router: Arc<Router>,
        dispatcher: Arc<dyn Dispatcher>,
        store: Arc<dyn CorrelationStore>,
    ) -> Self {
        Self {
            router,
            dispatcher,
            recorder: CorrelationRecorder::new(store),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Process one raw envelope.
    ///
    /// # Returns
    ///
    /// - `Ok(Skipped)` when routing declines the event
    /// - `Ok(Forwarded)` once the destination answered, regardless of status
    /// - `Err(Decode)` for malformed envelopes (no side effects)
    /// - `Err(Dispatch)` for transport failures (no correlation written)
    pub async fn process(&self, raw: &str) -> Result<ProcessingOutcome, PipelineError> {
        let event = ChangeEvent::decode(raw)?;
        self.process_event(&event).await
    }

    /// Process an already decoded event.
    pub async fn process_event(
        &self,
        event: &ChangeEvent,
    ) -> Result<ProcessingOutcome, PipelineError> {
        debug!(
            entity = %event.entity,
            operation = %event.operation,
            source = %event.source,
            "Processing event"
        );

        let decision = self.router.route(event);
        let Some(plan) = decision.plan().cloned() else {
            return Ok(ProcessingOutcome::Skipped { decision });
        };

        let response = self
            .dispatcher
            .dispatch(&plan.request)
            .await
            .map_err(|source| PipelineError::Dispatch {
                entity: event.entity.clone(),
                address: plan.request.address.clone(),
                source,
            })?;

        info!(
            entity = %event.entity,
            status = response.status,
            "Dispatch completed"
        );

        let correlation = self.recorder.record(event, &plan, &response).await;

        Ok(ProcessingOutcome::Forwarded {
            decision,
            response,
            correlation,
        })
    }
}
