//! Configuration-loading error types.

use thiserror::Error;

/// Errors raised while assembling gateway configuration at startup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The persistent configuration store could not be reached or queried.
    #[error("config store error: {0}")]
    Store(String),

    /// The environment layer could not be read or deserialized.
    #[error("environment layer error: {0}")]
    Environment(#[from] config::ConfigError),

    /// A mapping manifest could not be parsed.
    #[error("invalid mapping manifest: {0}")]
    Manifest(String),

    /// The materialized configuration failed gateway validation.
    #[error(transparent)]
    Gateway(#[from] apigate::GatewayError),
}

/// Convenience alias used throughout the crate.
pub type ConfigResult<T> = Result<T, ConfigError>;
