//! Content-based router
//!
//! Decides per event whether to forward it, where, with which verb and which
//! translator. Rules are applied in order:
//!
//! 1. Only CREATE events from the authoritative source are eligible.
//! 2. The entity must be registered with a translator.
//! 3. The translator must produce a destination payload.
//!
//! Every "no" is a [`SkipReason`], never an error.

use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dispatch::DispatchRequest;
use crate::event::{ChangeEvent, Operation, SourceSystem};
use crate::http::HttpMethod;
use crate::registry::{EntityRegistry, VerbTable};
use crate::translator::EntityTranslator;

/// Why an event is not forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Operation/source combination is not forwarded
    UnsupportedOperation {
        operation: Operation,
        source: SourceSystem,
    },
    /// No translator registered for the entity
    UnsupportedEntity(String),
    /// Translator could not produce a destination payload
    TranslationFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedOperation { operation, source } => {
                write!(f, "unsupported operation/source: {} from {}", operation, source)
            }
            Self::UnsupportedEntity(entity) => write!(f, "unsupported entity: {}", entity),
            Self::TranslationFailed(entity) => write!(f, "translation failed for {}", entity),
        }
    }
}

/// Everything needed to dispatch and later correlate a forwarded event.
#[derive(Debug, Clone)]
pub struct ForwardPlan {
    pub request: DispatchRequest,
    pub translator: Arc<dyn EntityTranslator>,
}

/// Forward or skip.
#[derive(Debug, Clone)]
pub enum RouteOutcome {
    Forward(ForwardPlan),
    Skip(SkipReason),
}

/// Routing decision for one event.
///
/// Address and verb are resolved for skipped events too, for logging.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub entity: String,
    pub operation: Operation,
    pub source: SourceSystem,
    pub address: String,
    pub verb: HttpMethod,
    pub outcome: RouteOutcome,
}

impl RoutingDecision {
    pub fn is_forward(&self) -> bool {
        matches!(self.outcome, RouteOutcome::Forward(_))
    }

    pub fn plan(&self) -> Option<&ForwardPlan> {
        match &self.outcome {
            RouteOutcome::Forward(plan) => Some(plan),
            RouteOutcome::Skip(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.outcome {
            RouteOutcome::Forward(_) => None,
            RouteOutcome::Skip(reason) => Some(reason),
        }
    }

    /// JSON summary, used by dry runs.
    pub fn to_json(&self) -> Value {
        let mut summary = json!({
            "entity": self.entity,
            "operation": self.operation.as_str(),
            "source": self.source.as_str(),
            "forward": self.is_forward(),
            "address": self.address,
            "verb": self.verb.as_str(),
        });

        match &self.outcome {
            RouteOutcome::Forward(plan) => {
                summary["translator"] = json!(plan.translator.entity_type());
                summary["payload"] = plan.request.payload.clone();
            }
            RouteOutcome::Skip(reason) => {
                summary["skip_reason"] = json!(reason.to_string());
            }
        }

        summary
    }
}

/// Stateless router over a shared registry.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<EntityRegistry>,
    base_url: String,
    authoritative_source: SourceSystem,
}

impl Router {
    /// Router with `ACADEMIC` as the authoritative source.
    pub fn new(registry: Arc<EntityRegistry>, base_url: impl Into<String>) -> Self {
        Self {
            registry,
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            authoritative_source: SourceSystem::Academic,
        }
    }

    /// Set the system of record for entity creation (builder pattern).
    pub fn with_authoritative_source(mut self, source: SourceSystem) -> Self {
        self.authoritative_source = source;
        self
    }

    pub fn authoritative_source(&self) -> SourceSystem {
        self.authoritative_source
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Absolute destination URL for an entity.
    pub fn resolve_address(&self, entity: &str) -> String {
        format!("{}{}", self.base_url, self.registry.resource_path(entity))
    }

    /// Route one decoded event.
    pub fn route(&self, event: &ChangeEvent) -> RoutingDecision {
        let verb = self
            .registry
            .get(&event.entity)
            .map(|b| b.verbs)
            .unwrap_or_else(VerbTable::default)
            .verb_for(event.operation);
        let address = self.resolve_address(&event.entity);

        let outcome = self.decide(event, address.clone(), verb);

        match &outcome {
            RouteOutcome::Forward(_) => {
                info!(
                    entity = %event.entity,
                    operation = %event.operation,
                    source = %event.source,
                    verb = %verb,
                    address = %address,
                    "Event routed for forwarding"
                );
            }
            RouteOutcome::Skip(reason) => {
                info!(
                    entity = %event.entity,
                    operation = %event.operation,
                    source = %event.source,
                    reason = %reason,
                    "Event ignored"
                );
            }
        }

        RoutingDecision {
            entity: event.entity.clone(),
            operation: event.operation,
            source: event.source,
            address,
            verb,
            outcome,
        }
    }

    fn decide(&self, event: &ChangeEvent, address: String, verb: HttpMethod) -> RouteOutcome {
        if event.operation != Operation::Create || event.source != self.authoritative_source {
            return RouteOutcome::Skip(SkipReason::UnsupportedOperation {
                operation: event.operation,
                source: event.source,
            });
        }

        let Some(translator) = self.registry.get(&event.entity).and_then(|b| b.translator.clone())
        else {
            return RouteOutcome::Skip(SkipReason::UnsupportedEntity(event.entity.clone()));
        };

        match translator.to_destination(&event.payload) {
            Some(payload) => {
                debug!(entity = %event.entity, %payload, "Destination payload");
                RouteOutcome::Forward(ForwardPlan {
                    request: DispatchRequest {
                        address,
                        verb,
                        payload,
                    },
                    translator,
                })
            }
            None => RouteOutcome::Skip(SkipReason::TranslationFailed(event.entity.clone())),
        }
    }
}
