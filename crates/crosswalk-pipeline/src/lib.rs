//! Pipeline Orchestration Layer
//!
//! Coordinates the crosswalk relay:
//!
//! 1. **Decode**: raw envelope to [`crosswalk_core::ChangeEvent`]
//! 2. **Route**: forward or skip, with address, verb and translated payload
//! 3. **Dispatch**: send the payload to the destination system
//! 4. **Correlate**: persist the canonical entity and identity correlation,
//!    best effort
//!
//! Infrastructure crates (do not orchestrate):
//! - `crosswalk-core`: decoding, translation, routing, HTTP dispatch
//! - `crosswalk-sqlite`: correlation storage
//!
//! ```rust,ignore
//! use crosswalk_pipeline::{EventPipeline, Relay};
//!
//! let pipeline = EventPipeline::new(router, dispatcher, store);
//! let shutdown = async {
//!     let _ = tokio::signal::ctrl_c().await;
//! };
//! let summary = Relay::new(pipeline)
//!     .with_max_in_flight(8)
//!     .run(source, shutdown)
//!     .await?;
//! ```

pub mod pipeline;
pub mod recorder;
pub mod relay;

pub use pipeline::{EventPipeline, PipelineError, ProcessingOutcome};
pub use recorder::{CorrelationError, CorrelationOutcome, CorrelationRecorder};
pub use relay::{Relay, RelayError, RelayStats, RelaySummary, DEFAULT_MAX_IN_FLIGHT};
