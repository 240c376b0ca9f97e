use std::time::Duration;

use enginesvc_core::EngineError;
use tokio::time::Instant;

use crate::balancer::RoundRobin;
use crate::endpoint::Endpoint;

/// Bounded retries over a balancer.
///
/// Each attempt asks the balancer for the next endpoint, so a retry lands on
/// a different instance whenever more than one is live. Attempts run one
/// after another and share a single time budget. Only retryable errors
/// (transport failures) lead to another attempt; anything else is returned
/// as-is.
///
/// Dropping the future returned by [`Endpoint::call`] cancels the in-flight
/// attempt and no further attempt is started.
pub struct Retry<E> {
    balancer: RoundRobin<E>,
    max_attempts: usize,
    timeout: Duration,
}

impl<E: Endpoint> Retry<E> {
    pub fn new(balancer: RoundRobin<E>, max_attempts: usize, timeout: Duration) -> Self {
        Self {
            balancer,
            max_attempts: max_attempts.max(1),
            timeout,
        }
    }
}

impl<E: Endpoint> Endpoint for Retry<E> {
    type Request = E::Request;
    type Response = E::Response;

    async fn call(&self, request: E::Request) -> Result<E::Response, EngineError> {
        let deadline = Instant::now() + self.timeout;
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            // an empty set only fails fast before any attempt has been made
            let endpoint = match self.balancer.endpoint() {
                Ok(endpoint) => endpoint,
                Err(err) => return Err(last_error.unwrap_or(err)),
            };

            match tokio::time::timeout_at(deadline, endpoint.call(request.clone())).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(err)) if !err.is_retryable() => return Err(err),
                Ok(Err(err)) => {
                    tracing::debug!(attempt, error = %err, "attempt failed");
                    last_error = Some(err);
                }
                Err(_elapsed) => {
                    tracing::warn!(attempt, timeout = ?self.timeout, "retry budget exhausted");
                    return Err(last_error.unwrap_or_else(|| {
                        EngineError::Transport(format!(
                            "retry budget of {:?} exhausted",
                            self.timeout
                        ))
                    }));
                }
            }
        }

        tracing::warn!(attempts = self.max_attempts, "all attempts failed");
        Err(last_error.unwrap_or(EngineError::NoInstancesAvailable))
    }
}
