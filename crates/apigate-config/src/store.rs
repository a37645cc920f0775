//! Cache-aside access to the persistent configuration store.
//!
//! The gateway only depends on a narrow contract: `lookup(key)` with
//! read-through semantics and a whole-store `refresh`. The persistent side
//! (a relational table in production) stays behind the [`ConfigStore`]
//! trait so the loader can be exercised against in-memory fakes.

use crate::error::{ConfigError, ConfigResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

/// Persistent key/value configuration store.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch a single value by key.
    async fn get(&self, key: &str) -> ConfigResult<Option<String>>;

    /// Fetch every stored key/value pair.
    async fn load_all(&self) -> ConfigResult<HashMap<String, String>>;
}

/// Read-through cache over a [`ConfigStore`].
///
/// `lookup` serves from the in-memory cache and falls back to the store on
/// miss, populating the cache with what it finds. `refresh` reloads the
/// whole cache; a store failure during refresh degrades to the existing
/// cache contents with a logged error instead of failing startup.
pub struct CachedConfigStore<S> {
    store: S,
    cache: RwLock<HashMap<String, String>>,
    initialized: AtomicBool,
}

impl<S: ConfigStore> CachedConfigStore<S> {
    /// Wrap a store with an empty cache.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Reload the cache from the store and return its contents.
    ///
    /// On store failure the previous contents are kept and returned.
    pub async fn refresh(&self) -> HashMap<String, String> {
        match self.store.load_all().await {
            Ok(all) => {
                debug!(entries = all.len(), "configuration cache refreshed");
                *self.cache.write() = all.clone();
                self.initialized.store(true, Ordering::SeqCst);
                all
            }
            Err(e) => {
                error!(error = %e, "failed to refresh configuration cache, keeping previous contents");
                self.cache.read().clone()
            }
        }
    }

    /// Cache-aside lookup: cache first, then the store, populating on hit.
    pub async fn lookup(&self, key: &str) -> ConfigResult<Option<String>> {
        if !self.initialized.load(Ordering::SeqCst) {
            self.refresh().await;
        }
        if let Some(value) = self.cache.read().get(key) {
            return Ok(Some(value.clone()));
        }
        let fetched = self.store.get(key).await?;
        if let Some(value) = &fetched {
            self.cache.write().insert(key.to_string(), value.clone());
        }
        Ok(fetched)
    }

    /// Current cache contents without touching the store.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.cache.read().clone()
    }
}

/// In-memory [`ConfigStore`], used in tests and single-process setups.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `values`.
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    /// Insert or overwrite a value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().insert(key.into(), value.into());
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn load_all(&self) -> ConfigResult<HashMap<String, String>> {
        Ok(self.values.read().clone())
    }
}

// =============================================================================
// Tests
// =============================================================================
