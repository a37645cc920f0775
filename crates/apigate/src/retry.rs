//! Outbound HTTP execution with bounded retries and linear backoff.
//!
//! [`RetryExecutor`] performs up to `max_retries + 1` attempts for a fully
//! resolved request. Transient failures (connection errors, per-attempt
//! timeouts, HTTP 5xx) are retried after a linearly growing delay; 4xx
//! responses fail fast and 2xx responses succeed, neither is ever retried.
//! The executor never blocks a caller beyond the per-attempt timeout plus
//! the backoff sleeps, and an in-flight attempt runs to its own timeout or
//! completion; there is no external cancellation channel.

use crate::error::{GatewayError, GatewayResult};
use crate::registry::HttpMethod;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// A fully resolved outbound request, ready to execute.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Absolute URL (base URL already joined with the rendered path).
    pub url: String,
    /// Query parameters (GET dispatches).
    pub query: Vec<(String, String)>,
    /// JSON body (write dispatches).
    pub body: Option<Value>,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retry budget; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Base backoff delay; the wait before attempt `n + 1` is `delay * n`.
    pub retry_delay: Duration,
}

enum AttemptOutcome {
    Success(Value),
    Retryable(String),
    Fatal { status: u16, body: String },
}

/// Executes [`RequestSpec`]s against the backend with retry and backoff.
///
/// Holds only the connection pool; all per-request knobs travel in the
/// spec, so a reconfigured client keeps reusing the same pool.
#[derive(Debug, Default)]
pub struct RetryExecutor {
    http: Client,
}

impl RetryExecutor {
    /// Create an executor with a fresh connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute `spec`, retrying transient failures within the budget.
    #[instrument(skip(self, spec), fields(method = %spec.method, url = %spec.url))]
    pub async fn execute(&self, spec: &RequestSpec) -> GatewayResult<Value> {
        let max_attempts = spec.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = spec.retry_delay * (attempt - 1);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }
            debug!(attempt, max_attempts, "attempt started");

            match self.attempt(spec).await {
                AttemptOutcome::Success(value) => {
                    info!(attempt, "request succeeded");
                    return Ok(value);
                }
                AttemptOutcome::Retryable(cause) => {
                    debug!(attempt, cause = %cause, "attempt failed, retryable");
                    last_error = cause;
                }
                AttemptOutcome::Fatal { status, body } => {
                    error!(attempt, status, "request rejected by backend");
                    return Err(GatewayError::RequestRejected { status, body });
                }
            }
        }

        error!(
            attempts = max_attempts,
            last_error = %last_error,
            "retries exhausted, backend unavailable"
        );
        Err(GatewayError::Unavailable {
            attempts: max_attempts,
            last_error,
        })
    }

    async fn attempt(&self, spec: &RequestSpec) -> AttemptOutcome {
        let mut request = self
            .http
            .request(spec.method.into(), &spec.url)
            .timeout(spec.timeout);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        // Send-time failures are connection-level (refused, reset, timed
        // out): all transient. Status-bearing failures are classified below.
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return AttemptOutcome::Retryable(e.to_string()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => return AttemptOutcome::Retryable(e.to_string()),
        };

        if status.is_success() {
            AttemptOutcome::Success(decode_body(body))
        } else if status.is_server_error() {
            AttemptOutcome::Retryable(format!("backend returned {status}"))
        } else {
            AttemptOutcome::Fatal {
                status: status.as_u16(),
                body,
            }
        }
    }
}

/// Decode a 2xx body. Empty bodies become `null`; non-JSON bodies are
/// surfaced verbatim as a JSON string rather than raising a decode error.
fn decode_body(body: String) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => Value::String(body),
    }
}
