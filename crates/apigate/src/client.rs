//! The gateway client: logical-function dispatch over HTTP.
//!
//! [`GatewayClient`] composes the endpoint registry, the response cache and
//! the retry executor behind the one externally consumed surface:
//! [`invoke`](GatewayClient::invoke). It is constructed exactly once by the
//! composition root and shared by handle (`Arc`) across concurrent request
//! handlers; every method takes `&self`.

use crate::cache::{ResponseCache, cache_key};
use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::registry::{EndpointMapping, EndpointRegistry, HttpMethod, render_value};
use crate::retry::{RequestSpec, RetryExecutor};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Client that dispatches logical function calls to a configured HTTP
/// backend with retries, timeouts and transparent response caching.
///
/// # Construction
///
/// [`new`](Self::new) is an explicit factory: it validates the supplied
/// configuration and returns an owned instance. There is no hidden global;
/// the composition root decides how the instance is shared. A second
/// construction never reconfigures an existing instance; hot reload is
/// the explicit [`reconfigure`](Self::reconfigure) method.
///
/// # Concurrency
///
/// All methods take `&self` and the client is `Send + Sync`. Concurrent
/// invocations for different keys are independent; two concurrent cache
/// misses for the *same* key may both reach the network (no single-flight
/// de-duplication).
pub struct GatewayClient {
    config: RwLock<GatewayConfig>,
    registry: EndpointRegistry,
    cache: ResponseCache,
    executor: RetryExecutor,
}

impl GatewayClient {
    /// Build a client from a validated configuration.
    ///
    /// Fails with a configuration error rather than producing a
    /// half-configured client.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;
        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            max_retries = config.max_retries,
            cache_enabled = config.cache.enabled,
            "gateway client initialized"
        );
        let cache = ResponseCache::new(config.cache.clone());
        Ok(Self {
            config: RwLock::new(config),
            registry: EndpointRegistry::new(),
            cache,
            executor: RetryExecutor::new(),
        })
    }

    /// Register or overwrite an endpoint mapping (last-write-wins).
    ///
    /// Usable at any time after construction; routing is hot-reloadable.
    pub fn register_function(
        &self,
        function_name: impl Into<String>,
        path_template: impl Into<String>,
        method: HttpMethod,
    ) {
        self.registry
            .register(EndpointMapping::new(function_name, path_template, method));
    }

    /// Swap in a new validated configuration and clear the response cache.
    pub fn reconfigure(&self, config: GatewayConfig) -> GatewayResult<()> {
        config.validate()?;
        self.cache.set_policy(config.cache.clone());
        info!(base_url = %config.base_url, "gateway client reconfigured");
        *self.config.write() = config;
        Ok(())
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> GatewayConfig {
        self.config.read().clone()
    }

    /// Registered endpoint mappings count.
    pub fn registered_functions(&self) -> usize {
        self.registry.len()
    }

    /// Invoke a logical function with a JSON argument map.
    ///
    /// Flow: registry resolution → cache lookup (GET-mapped functions
    /// only) → retried HTTP exchange → cache population. Dispatch errors
    /// (`UnknownFunction`, `MissingPathParameter`) propagate immediately
    /// with zero network attempts; transport errors propagate unchanged.
    pub async fn invoke(
        &self,
        function: &str,
        args: &Map<String, Value>,
    ) -> GatewayResult<Value> {
        // Snapshot the config up front; the lock is never held across await.
        let config = self.config.read().clone();

        let mapping = self.registry.resolve(function)?;

        // Cacheability follows the *current* mapping. A function remapped
        // from GET to a write method must not be served from entries its
        // GET incarnation stored.
        let key = mapping
            .method
            .is_cacheable()
            .then(|| cache_key(function, args));
        if let Some(key) = &key {
            if let Some(hit) = self.cache.get(key) {
                debug!(function, "cache hit, skipping network call");
                return Ok(hit);
            }
        }

        let rendered = mapping.render(args)?;

        let url = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            rendered.path.trim_start_matches('/')
        );
        let (query, body) = if mapping.method.has_body() {
            let body = if rendered.leftover.is_empty() {
                None
            } else {
                Some(Value::Object(rendered.leftover))
            };
            (Vec::new(), body)
        } else {
            let query = rendered
                .leftover
                .into_iter()
                .map(|(name, value)| (name, render_value(&value)))
                .collect();
            (query, None)
        };

        let spec = RequestSpec {
            method: mapping.method,
            url,
            query,
            body,
            timeout: config.timeout(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        };
        let result = self.executor.execute(&spec).await?;

        if let Some(key) = &key {
            self.cache.put(key, result.clone(), config.cache.ttl());
        }
        Ok(result)
    }
}
