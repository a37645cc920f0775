//! Gateway error types.
//!
//! [`GatewayError`] covers every failure mode of the gateway client:
//! configuration errors detected at construction time (before any network
//! I/O occurs), dispatch errors raised while resolving a logical function
//! name, and transport errors raised while talking to the backend.
//!
//! All errors surface to the immediate caller; logging inside the gateway
//! never replaces propagation.

use thiserror::Error;

/// Error type for the gateway client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    // ── Configuration ───────────────────────────────────────────────────────
    /// The configuration `base_url` field is empty or whitespace-only.
    #[error("gateway base_url is required")]
    MissingBaseUrl,

    /// The configuration `base_url` is not an absolute http(s) URL.
    #[error("gateway base_url '{0}' is not an http(s) URL")]
    InvalidBaseUrl(String),

    /// `timeout_ms` is zero, which would reject every request.
    #[error("request timeout must be greater than 0 ms")]
    InvalidTimeout,

    /// `cache.ttl_ms` is zero while caching is enabled.
    #[error("cache ttl must be greater than 0 ms when caching is enabled")]
    InvalidCacheTtl,

    /// An unknown log level string was supplied.
    #[error("unknown log level '{0}' (expected debug, info, warn or error)")]
    InvalidLogLevel(String),

    /// An HTTP method string could not be parsed.
    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    // ── Dispatch ────────────────────────────────────────────────────────────
    /// No endpoint mapping is registered for the requested logical name.
    /// Never retried; no network I/O is performed.
    #[error("no endpoint mapping registered for function '{0}'")]
    UnknownFunction(String),

    /// A path-template placeholder could not be substituted from the
    /// supplied arguments. Never retried.
    #[error("function '{function}' requires path parameter '{parameter}' which was not supplied")]
    MissingPathParameter { function: String, parameter: String },

    // ── Transport ───────────────────────────────────────────────────────────
    /// The backend answered with a non-transient failure (4xx). Carries the
    /// status and the raw response body. Never retried.
    #[error("backend rejected request with status {status}: {body}")]
    RequestRejected { status: u16, body: String },

    /// Every attempt failed with a transient error (timeout, connection
    /// failure, 5xx). Carries the attempt count and the last cause.
    #[error("backend unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

/// Convenience alias used throughout the crate.
pub type GatewayResult<T> = Result<T, GatewayError>;
