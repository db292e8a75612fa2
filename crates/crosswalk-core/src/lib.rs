//! Core types of the crosswalk change-event relay.
//!
//! An upstream system publishes a [`ChangeEvent`]; the [`Router`] decides
//! whether and where to forward it; a [`Dispatcher`] delivers the translated
//! payload; a [`CorrelationStore`] remembers which canonical entity the
//! forwarded record became.

pub mod canonical;
pub mod dispatch;
pub mod event;
pub mod http;
pub mod registry;
pub mod router;
pub mod storage;
pub mod translator;
pub mod transport;

pub use canonical::{CanonicalEntity, CanonicalId, IdentityCorrelation, SyncStatus};
pub use dispatch::{DispatchError, DispatchRequest, DispatchResponse, Dispatcher, HttpDispatcher};
pub use event::{ChangeEvent, DecodeError, Operation, SourceSystem};
pub use http::{HttpError, HttpExecutor, HttpMethod, HttpRequest, HttpResponse};
pub use registry::{EntityBinding, EntityRegistry, VerbTable};
pub use router::{ForwardPlan, RouteOutcome, Router, RoutingDecision, SkipReason};
pub use storage::{CorrelationStore, MemoryCorrelationStore, StorageError, StorageResult};
pub use translator::{
    split_full_name, EntityTranslator, StudentTranslator, TranslationError, STUDENT_ENTITY,
};
pub use transport::{
    channel, ChannelPublisher, ChannelSource, EventSource, InboundMessage, LineSource,
    TransportError, DEFAULT_CHANNEL,
};
