//! Startup configuration for the gateway client.
//!
//! Three concerns live here, all collaborators of [`apigate`]:
//!
//! | Concern | Component |
//! |---------|-----------|
//! | cache-aside access to the persistent store | [`store::CachedConfigStore`] |
//! | defaults → env → store cascade | [`settings::GatewaySettings`] |
//! | endpoint-mapping manifest | [`mappings`] |
//!
//! # Typical startup
//!
//! ```rust,no_run
//! use apigate::GatewayClient;
//! use apigate_config::{
//!     load_gateway_config, apply_mappings, parse_manifest,
//!     CachedConfigStore, InMemoryConfigStore,
//! };
//!
//! # async fn startup() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CachedConfigStore::new(InMemoryConfigStore::new());
//! let config = load_gateway_config(&store).await?;
//! let client = GatewayClient::new(config)?;
//!
//! let manifest = std::fs::read_to_string("mappings.json")?;
//! apply_mappings(&client, &parse_manifest(&manifest)?);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mappings;
pub mod settings;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use mappings::{MappingEntry, apply_mappings, parse_manifest};
pub use settings::{ENV_PREFIX, GatewaySettings, load_gateway_config};
pub use store::{CachedConfigStore, ConfigStore, InMemoryConfigStore};
