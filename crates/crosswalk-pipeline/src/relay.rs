//! Relay loop
//!
//! Pulls raw envelopes from an [`EventSource`] and runs each through the
//! pipeline as its own task. Concurrency is bounded by a semaphore; there is
//! no ordering across events. Per-event failures are logged and counted and
//! never stop the loop.

use crosswalk_core::{EventSource, TransportError};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::pipeline::{EventPipeline, ProcessingOutcome};
use crate::recorder::CorrelationOutcome;

/// Default number of events processed concurrently
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Failures that stop the relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("Concurrency limiter closed")]
    LimiterClosed,
}

/// Live counters, shared with in-flight tasks
#[derive(Debug, Default)]
pub struct RelayStats {
    received: AtomicUsize,
    forwarded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    correlations_recorded: AtomicUsize,
    correlation_failures: AtomicUsize,
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one processing result into the counters.
    pub fn observe(&self, result: &Result<ProcessingOutcome, crate::PipelineError>) {
        match result {
            Ok(ProcessingOutcome::Skipped { .. }) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Ok(ProcessingOutcome::Forwarded { correlation, .. }) => {
                self.forwarded.fetch_add(1, Ordering::Relaxed);
                match correlation {
                    CorrelationOutcome::Recorded { .. } => {
                        self.correlations_recorded.fetch_add(1, Ordering::Relaxed);
                    }
                    CorrelationOutcome::Abandoned(_) => {
                        self.correlation_failures.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            Err(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> RelaySummary {
        RelaySummary {
            received: self.received.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            correlations_recorded: self.correlations_recorded.load(Ordering::Relaxed),
            correlation_failures: self.correlation_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelaySummary {
    pub received: usize,
    pub forwarded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub correlations_recorded: usize,
    pub correlation_failures: usize,
}

impl RelaySummary {
    /// Every received event has reached a final state
    pub fn is_settled(&self) -> bool {
        self.received == self.forwarded + self.skipped + self.failed
    }
}

/// Drives an event source through the pipeline.
pub struct Relay {
    pipeline: EventPipeline,
    max_in_flight: usize,
    stats: Arc<RelayStats>,
}

impl Relay {
    pub fn new(pipeline: EventPipeline) -> Self {
        Self {
            pipeline,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            stats: Arc::new(RelayStats::new()),
        }
    }

    /// Set the concurrency limit (builder pattern). Zero is treated as one.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn stats(&self) -> Arc<RelayStats> {
        Arc::clone(&self.stats)
    }

    /// Run until the source is exhausted or `shutdown` resolves.
    ///
    /// In-flight events are always awaited before returning. A transport
    /// failure stops intake and is returned after draining.
    pub async fn run<S, F>(&self, mut source: S, shutdown: F) -> Result<RelaySummary, RelayError>
    where
        S: EventSource,
        F: Future<Output = ()>,
    {
        info!(
            source = %source.describe(),
            max_in_flight = self.max_in_flight,
            "Relay started"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();
        let mut outcome = Ok(());
        tokio::pin!(shutdown);

        loop {
            let permit = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting events");
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        outcome = Err(RelayError::LimiterClosed);
                        break;
                    }
                },
            };

            let message = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting events");
                    break;
                }
                message = source.next_message() => message,
            };

            let message = match message {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("Event source exhausted");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Event source failed");
                    outcome = Err(e.into());
                    break;
                }
            };

            self.stats.received.fetch_add(1, Ordering::Relaxed);
            let pipeline = self.pipeline.clone();
            let stats = Arc::clone(&self.stats);

            tasks.spawn(async move {
                let _permit = permit; // Release on drop

                let result = pipeline.process(&message.body).await;
                if let Err(e) = &result {
                    error!(error = %e, "Event failed");
                }
                stats.observe(&result);
            });

            while let Some(joined) = tasks.try_join_next() {
                self.reap(joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.reap(joined);
        }

        let summary = self.stats.snapshot();
        info!(
            received = summary.received,
            forwarded = summary.forwarded,
            skipped = summary.skipped,
            failed = summary.failed,
            correlations_recorded = summary.correlations_recorded,
            correlation_failures = summary.correlation_failures,
            "Relay stopped"
        );

        outcome.map(|()| summary)
    }

    fn reap(&self, joined: Result<(), tokio::task::JoinError>) {
        if let Err(e) = joined {
            warn!(error = %e, "Event task panicked");
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}
