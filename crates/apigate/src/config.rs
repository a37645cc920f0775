//! Gateway configuration and validation.
//!
//! [`GatewayConfig`] is materialized once at startup by the composition
//! root (usually through `apigate-config`) and captured by the client at
//! construction. Call [`validate()`](GatewayConfig::validate) before
//! handing it to [`GatewayClient::new`](crate::GatewayClient::new); the
//! client does the same and refuses to build a half-configured instance.

use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default retry budget (total attempts = retries + 1).
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default base delay between attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
/// Default time-to-live for cached responses.
pub const DEFAULT_CACHE_TTL_MS: u64 = 60_000;

// ─────────────────────────────────────────────────────────────────────────────
// LogLevel
// ─────────────────────────────────────────────────────────────────────────────

/// Verbosity level for gateway logging.
///
/// The gateway itself always emits through `tracing`; this value lets the
/// composition root build its subscriber filter from the same configuration
/// cascade that produced the rest of [`GatewayConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The equivalent `tracing` level, for subscriber filters.
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(GatewayError::InvalidLogLevel(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CachePolicy
// ─────────────────────────────────────────────────────────────────────────────

/// Response-cache parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Master switch. When `false` the cache neither serves nor stores.
    pub enabled: bool,
    /// Time-to-live for stored entries in milliseconds.
    pub ttl_ms: u64,
}

impl CachePolicy {
    /// Enabled cache with the given ttl.
    pub fn enabled(ttl_ms: u64) -> Self {
        Self {
            enabled: true,
            ttl_ms,
        }
    }

    /// Fully disabled cache.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }

    /// Entry lifetime as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::enabled(DEFAULT_CACHE_TTL_MS)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GatewayConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level gateway client configuration.
///
/// Constructed once at process start; consumers receive the client by
/// shared handle and never re-read configuration ad hoc. Hot reload goes
/// through [`GatewayClient::reconfigure`](crate::GatewayClient::reconfigure),
/// never through a second construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Backend base URL; all endpoint paths are resolved relative to it.
    pub base_url: String,
    /// Per-attempt timeout in milliseconds (must be > 0).
    pub timeout_ms: u64,
    /// Retry budget; 0 means a single attempt with no retry.
    pub max_retries: u32,
    /// Base delay between attempts in milliseconds (linear backoff).
    pub retry_delay_ms: u64,
    /// Verbosity for gateway logging.
    pub log_level: LogLevel,
    /// Response-cache parameters.
    pub cache: CachePolicy,
}

impl GatewayConfig {
    /// Construct a config with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            log_level: LogLevel::default(),
            cache: CachePolicy::default(),
        }
    }

    /// Builder: set the per-attempt timeout.
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Builder: set the retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Builder: set the base retry delay.
    pub fn with_retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry_delay_ms = ms;
        self
    }

    /// Builder: set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Builder: set the cache policy.
    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    /// Per-attempt timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base retry delay as a [`Duration`].
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Validate all structural invariants of this configuration.
    ///
    /// Returns the *first* detected [`GatewayError`]. Checks performed (in
    /// order): base URL is non-empty, base URL carries an http(s) scheme,
    /// timeout is non-zero, cache ttl is non-zero when caching is enabled.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(GatewayError::MissingBaseUrl);
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(GatewayError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_ms == 0 {
            return Err(GatewayError::InvalidTimeout);
        }
        if self.cache.enabled && self.cache.ttl_ms == 0 {
            return Err(GatewayError::InvalidCacheTtl);
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
