//! Scripted endpoints for dispatch tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use enginesvc_core::EngineError;

use crate::endpoint::Endpoint;

/// Answers with `"<address>:<request>"` or a fixed error, counting calls.
#[derive(Debug)]
pub(crate) struct FakeEndpoint {
    address: String,
    outcome: Result<(), EngineError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FakeEndpoint {
    pub(crate) fn succeeding(address: &str) -> Self {
        Self {
            address: address.to_string(),
            outcome: Ok(()),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn failing(address: &str, err: EngineError) -> Self {
        Self {
            outcome: Err(err),
            ..Self::succeeding(address)
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shares a call counter with other endpoints.
    pub(crate) fn counting(mut self, calls: Arc<AtomicUsize>) -> Self {
        self.calls = calls;
        self
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }
}

impl Endpoint for FakeEndpoint {
    type Request = String;
    type Response = String;

    async fn call(&self, request: String) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome
            .clone()
            .map(|()| format!("{}:{request}", self.address))
    }
}
