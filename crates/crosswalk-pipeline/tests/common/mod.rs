//! Shared test doubles for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use crosswalk_core::{
    CanonicalEntity, CanonicalId, CorrelationStore, DispatchError, DispatchRequest,
    DispatchResponse, Dispatcher, EntityRegistry, HttpError, IdentityCorrelation, Router,
    StorageError, StorageResult,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://library.test";

pub fn router() -> Arc<Router> {
    Arc::new(Router::new(Arc::new(EntityRegistry::with_defaults()), BASE_URL))
}

/// Wire envelope with an inline JSON-string payload
pub fn envelope(entity: &str, operation: &str, source: &str, data: Value) -> String {
    json!({
        "entity": entity,
        "operation": operation,
        "source": source,
        "data": data.to_string(),
        "timestamp": "2024-01-01T10:00:00"
    })
    .to_string()
}

pub fn student_create(id: u64, full_name: &str) -> String {
    envelope(
        "Student",
        "CREATE",
        "ACADEMIC",
        json!({"id": id, "full_name": full_name, "status_loans": "SETTLED"}),
    )
}

// ============================================================================
// Mock dispatcher
// ============================================================================

enum Reply {
    Respond(u16, String),
    Fail(HttpError),
}

struct MockDispatcherState {
    requests: Vec<DispatchRequest>,
    reply: Reply,
    delay: Option<Duration>,
    next_id: u64,
    numbered: bool,
}

/// Records every request; answers with a fixed reply
#[derive(Clone)]
pub struct MockDispatcher {
    state: Arc<Mutex<MockDispatcherState>>,
}

impl MockDispatcher {
    /// 201 with a fixed body
    pub fn responding(status: u16, body: &str) -> Self {
        Self::with_reply(Reply::Respond(status, body.to_string()), false)
    }

    /// 201 with `{"id": "dest-N"}`, N counting from 1
    pub fn numbered() -> Self {
        Self::with_reply(Reply::Respond(201, String::new()), true)
    }

    /// Transport failure on every call
    pub fn failing() -> Self {
        Self::with_reply(
            Reply::Fail(HttpError::Request("connection refused".to_string())),
            false,
        )
    }

    fn with_reply(reply: Reply, numbered: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockDispatcherState {
                requests: Vec::new(),
                reply,
                delay: None,
                next_id: 1,
                numbered,
            })),
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<DispatchRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResponse, DispatchError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.numbered {
            let id = state.next_id;
            state.next_id += 1;
            return Ok(DispatchResponse::new(201, json!({"id": format!("dest-{}", id)}).to_string()));
        }
        match &state.reply {
            Reply::Respond(status, body) => Ok(DispatchResponse::new(*status, body.clone())),
            Reply::Fail(err) => Err(DispatchError::Transport(err.clone())),
        }
    }
}

// ============================================================================
// Failing store
// ============================================================================

/// Store whose writes always fail; counts attempts
#[derive(Clone, Default)]
pub struct FailingStore {
    attempts: Arc<Mutex<usize>>,
}

impl FailingStore {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl CorrelationStore for FailingStore {
    async fn record(
        &self,
        _canonical: &CanonicalEntity,
        _correlation: &IdentityCorrelation,
    ) -> StorageResult<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(StorageError::backend("disk I/O error"))
    }

    async fn get_canonical(&self, _id: &CanonicalId) -> StorageResult<Option<CanonicalEntity>> {
        Ok(None)
    }

    async fn get_correlation(
        &self,
        _id: &CanonicalId,
    ) -> StorageResult<Option<IdentityCorrelation>> {
        Ok(None)
    }

    async fn find_by_source_id(
        &self,
        _entity_type: &str,
        _source_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>> {
        Ok(Vec::new())
    }

    async fn find_by_destination_id(
        &self,
        _entity_type: &str,
        _destination_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>> {
        Ok(Vec::new())
    }

    async fn list_correlations(&self, _limit: usize) -> StorageResult<Vec<IdentityCorrelation>> {
        Ok(Vec::new())
    }

    async fn count_correlations(&self) -> StorageResult<usize> {
        Ok(0)
    }
}
