//! Dispatcher: sends translated payloads to the destination system.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::canonical::extract_id;
use crate::http::{HttpError, HttpExecutor, HttpMethod, HttpRequest, DEFAULT_TIMEOUT, JSON_CONTENT_TYPE};

/// What to send, and where.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRequest {
    /// Absolute destination URL
    pub address: String,
    pub verb: HttpMethod,
    /// Destination representation
    pub payload: Value,
}

/// Observed response of a completed dispatch.
///
/// Any HTTP status counts as completed, including 4xx/5xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResponse {
    pub status: u16,
    pub body: String,
}

impl DispatchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Identifier assigned by the destination, read from the `id` field of a
    /// JSON body. Absent for non-JSON bodies or bodies without a usable `id`.
    pub fn destination_id(&self) -> Option<String> {
        let body: Value = serde_json::from_str(&self.body).ok()?;
        extract_id(&body)
    }
}

/// Failure to reach the destination system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Transport failure: {0}")]
    Transport(#[from] HttpError),

    #[error("Failed to encode payload: {0}")]
    Encode(String),
}

/// Sends one request to the destination system.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResponse, DispatchError>;
}

/// Dispatcher over HTTP with a JSON body.
#[derive(Clone)]
pub struct HttpDispatcher {
    executor: HttpExecutor,
    timeout: Duration,
}

impl Default for HttpDispatcher {
    fn default() -> Self {
        Self::new(HttpExecutor::new())
    }
}

impl HttpDispatcher {
    pub fn new(executor: HttpExecutor) -> Self {
        Self {
            executor,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-request timeout (builder pattern).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResponse, DispatchError> {
        let body = serde_json::to_string(&request.payload)
            .map_err(|e| DispatchError::Encode(e.to_string()))?;

        info!(verb = %request.verb, address = %request.address, "Dispatching");
        debug!(body = %body, "Dispatch body");

        let http_request = HttpRequest::new(request.verb, request.address.clone())
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body(body)
            .timeout(self.timeout);

        let response = self.executor.execute(http_request).await?;

        if response.is_success() {
            info!(status = response.status, "Destination accepted request");
        } else {
            warn!(
                status = response.status,
                body = %response.body,
                "Destination returned a non-success status"
            );
        }

        Ok(DispatchResponse::new(response.status, response.body))
    }
}
