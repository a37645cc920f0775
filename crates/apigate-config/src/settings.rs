//! Startup configuration cascade.
//!
//! Gateway configuration is assembled from a fixed-order list of sources
//! (built-in defaults, then `APIGATE_*` environment variables, then values
//! from the persistent store) and materialized exactly once into an
//! immutable [`GatewayConfig`] that is passed by handle thereafter.
//! Nothing re-reads the environment or the store ad hoc afterwards.

use crate::error::{ConfigError, ConfigResult};
use crate::store::{CachedConfigStore, ConfigStore};
use apigate::{CachePolicy, GatewayConfig, GatewayError, LogLevel};
use config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable prefix (`APIGATE_BASE_URL`, `APIGATE_TIMEOUT_MS`, …).
pub const ENV_PREFIX: &str = "APIGATE";

// Fixed keys consulted in the persistent store.
const KEY_BASE_URL: &str = "API_BASE_URL";
const KEY_TIMEOUT_MS: &str = "TIMEOUT_MS";
const KEY_MAX_RETRIES: &str = "MAX_RETRIES";
const KEY_RETRY_DELAY_MS: &str = "RETRY_DELAY_MS";
const KEY_LOG_LEVEL: &str = "LOG_LEVEL";
const KEY_CACHE_ENABLED: &str = "CACHE_ENABLED";
const KEY_CACHE_TTL_MS: &str = "CACHE_TTL_MS";

/// One layer of the configuration cascade; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySettings {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub log_level: Option<LogLevel>,
    pub cache_enabled: Option<bool>,
    pub cache_ttl_ms: Option<u64>,
}

impl GatewaySettings {
    /// Read the environment layer (`APIGATE_*`).
    pub fn from_env() -> ConfigResult<Self> {
        let cfg = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Build the store layer from fixed keys.
    ///
    /// Unparseable values are skipped with a logged warning so the previous
    /// cascade layer wins for that field; they never fail startup.
    pub fn from_store_values(values: &HashMap<String, String>) -> Self {
        Self {
            base_url: values.get(KEY_BASE_URL).cloned(),
            timeout_ms: parse_value(values, KEY_TIMEOUT_MS),
            max_retries: parse_value(values, KEY_MAX_RETRIES),
            retry_delay_ms: parse_value(values, KEY_RETRY_DELAY_MS),
            log_level: parse_value(values, KEY_LOG_LEVEL),
            cache_enabled: parse_bool(values, KEY_CACHE_ENABLED),
            cache_ttl_ms: parse_value(values, KEY_CACHE_TTL_MS),
        }
    }

    /// Overlay `other` on top of this layer; later layers win per field.
    pub fn merged(self, other: Self) -> Self {
        Self {
            base_url: other.base_url.or(self.base_url),
            timeout_ms: other.timeout_ms.or(self.timeout_ms),
            max_retries: other.max_retries.or(self.max_retries),
            retry_delay_ms: other.retry_delay_ms.or(self.retry_delay_ms),
            log_level: other.log_level.or(self.log_level),
            cache_enabled: other.cache_enabled.or(self.cache_enabled),
            cache_ttl_ms: other.cache_ttl_ms.or(self.cache_ttl_ms),
        }
    }

    /// Materialize the collapsed cascade into a validated [`GatewayConfig`].
    ///
    /// A missing `base_url` after the full cascade is fatal; everything
    /// else falls back to the gateway defaults.
    pub fn materialize(self) -> ConfigResult<GatewayConfig> {
        let base_url = match self.base_url {
            Some(url) if !url.trim().is_empty() => url,
            _ => return Err(GatewayError::MissingBaseUrl.into()),
        };

        let mut config = GatewayConfig::new(base_url);
        if let Some(v) = self.timeout_ms {
            config.timeout_ms = v;
        }
        if let Some(v) = self.max_retries {
            config.max_retries = v;
        }
        if let Some(v) = self.retry_delay_ms {
            config.retry_delay_ms = v;
        }
        if let Some(v) = self.log_level {
            config.log_level = v;
        }
        let mut cache = CachePolicy::default();
        if let Some(v) = self.cache_enabled {
            cache.enabled = v;
        }
        if let Some(v) = self.cache_ttl_ms {
            cache.ttl_ms = v;
        }
        config.cache = cache;

        config.validate()?;
        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            max_retries = config.max_retries,
            retry_delay_ms = config.retry_delay_ms,
            log_level = %config.log_level,
            cache_enabled = config.cache.enabled,
            cache_ttl_ms = config.cache.ttl_ms,
            "gateway configuration materialized"
        );
        Ok(config)
    }
}

/// Full startup cascade: defaults → environment → persistent store.
///
/// Refreshes the cache-aside store as a side effect, exactly once.
pub async fn load_gateway_config<S: ConfigStore>(
    store: &CachedConfigStore<S>,
) -> ConfigResult<GatewayConfig> {
    let env = GatewaySettings::from_env()?;
    let store_values = store.refresh().await;
    let from_store = GatewaySettings::from_store_values(&store_values);
    GatewaySettings::default()
        .merged(env)
        .merged(from_store)
        .materialize()
}

fn parse_value<T>(values: &HashMap<String, String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = values.get(key)?;
    match raw.parse::<T>() {
        Ok(value) => {
            debug!(key, value = %raw, "store configuration value applied");
            Some(value)
        }
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring unparseable store value");
            None
        }
    }
}

fn parse_bool(values: &HashMap<String, String>, key: &str) -> Option<bool> {
    let raw = values.get(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => {
            warn!(key, value = %raw, "ignoring unparseable store value");
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
