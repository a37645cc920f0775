//! Dynamic API gateway client.
//!
//! Dispatches *logical function calls* (a stable string name plus a JSON
//! argument map) to a configured HTTP backend, decoupling call sites from
//! backend routing:
//!
//! | Concern | Component |
//! |---------|-----------|
//! | name → endpoint resolution | [`registry::EndpointRegistry`] |
//! | idempotent response caching | [`cache::ResponseCache`] |
//! | retries, backoff, timeouts | [`retry::RetryExecutor`] |
//! | composition / public surface | [`client::GatewayClient`] |
//!
//! The routing table is runtime-mutable (last-write-wins), GET responses
//! are transparently cached with time-based eviction, and transient
//! backend failures are retried with linear backoff while 4xx failures
//! fail fast. Startup configuration loading (environment plus persistent
//! store, cache-aside) lives in the companion `apigate-config` crate.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use apigate::{GatewayClient, GatewayConfig, HttpMethod};
//! use serde_json::{Map, json};
//!
//! #[tokio::main]
//! async fn main() -> apigate::GatewayResult<()> {
//!     let client = GatewayClient::new(
//!         GatewayConfig::new("https://backend.example.com").with_max_retries(3),
//!     )?;
//!     client.register_function("getOrderStatus", "/orders/{id}/status", HttpMethod::Get);
//!
//!     let mut args = Map::new();
//!     args.insert("id".to_string(), json!("A-1042"));
//!     let status = client.invoke("getOrderStatus", &args).await?;
//!     println!("{status}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod retry;

pub use cache::{ResponseCache, cache_key};
pub use client::GatewayClient;
pub use config::{CachePolicy, GatewayConfig, LogLevel};
pub use error::{GatewayError, GatewayResult};
pub use registry::{EndpointMapping, EndpointRegistry, HttpMethod};
pub use retry::{RequestSpec, RetryExecutor};
