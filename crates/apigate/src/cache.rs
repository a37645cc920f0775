//! Time-bounded response cache.
//!
//! Stores decoded backend responses keyed by logical function name plus
//! canonically serialized arguments. Entries expire `ttl` after insertion
//! and are evicted lazily on the read path; no background sweep runs.
//! The cache is in-memory and process-scoped, lost on restart.

use crate::config::CachePolicy;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory TTL cache for idempotent gateway responses.
///
/// When the policy disables caching, [`get`](Self::get) always reports
/// absent and [`put`](Self::put) is a no-op, so callers never need their
/// own enabled check. Concurrent readers and writers are safe; a read
/// never observes a partially-written entry.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    policy: RwLock<CachePolicy>,
}

impl ResponseCache {
    /// Create a cache governed by `policy`.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy: RwLock::new(policy),
        }
    }

    /// Swap the governing policy and drop all stored entries.
    ///
    /// Used on reconfiguration: entries stored under the old policy may
    /// carry a ttl the new policy never permitted.
    pub fn set_policy(&self, policy: CachePolicy) {
        *self.policy.write() = policy;
        self.entries.clear();
    }

    /// Whether the cache currently stores and serves entries.
    pub fn is_enabled(&self) -> bool {
        self.policy.read().enabled
    }

    /// Fetch a fresh entry. Absent when never stored, expired or disabled.
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            // Lazy eviction: the guard from the lookup above is dropped, so
            // removing here cannot deadlock.
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
            debug!(key, "evicted expired cache entry");
        }
        None
    }

    /// Store or overwrite an entry expiring `ttl` from now. No-op when
    /// the cache is disabled.
    pub fn put(&self, key: &str, value: Value, ttl: Duration) {
        if !self.is_enabled() {
            return;
        }
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Explicitly drop one entry.
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deterministic cache key for a `(function, args)` pair.
///
/// Object keys are sorted at every nesting level before serialization, so
/// two argument maps with the same contents always produce the same key
/// regardless of insertion order (and regardless of whether some other
/// crate in the build enables serde_json's `preserve_order` feature).
pub fn cache_key(function: &str, args: &Map<String, Value>) -> String {
    let mut key = String::with_capacity(function.len() + 2);
    key.push_str(function);
    key.push(':');
    write_canonical(&Value::Object(args.clone()), &mut key);
    key
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| k.as_str());
            out.push('{');
            for (i, (k, v)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*k).clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================
