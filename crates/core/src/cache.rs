// crates/core/src/cache.rs
//! TTL-bounded result cache for derived statistics.
//!
//! Keys are `operation` plus a canonicalized parameter set; values are
//! opaque JSON. Eviction at capacity removes the single
//! oldest-inserted entry -- insertion order, deliberately not LRU.
//! Expired entries are evicted lazily on access.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::clock::Clock;

/// Observability snapshot for the cache.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    /// `entries / capacity`, 0..=1.
    pub utilization: f64,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, 0 when no lookups yet.
    pub hit_rate: f64,
    pub evictions: u64,
    pub expirations: u64,
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

#[derive(Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

struct CacheInner {
    map: HashMap<String, CacheEntry>,
    /// Keys in insertion order; front is oldest. May hold stale keys
    /// for entries already expired away -- skipped during eviction.
    insertion_order: VecDeque<String>,
    counters: Counters,
}

/// Bounded map from canonical query key to `(value, expiry)`.
pub struct QueryCache {
    clock: Arc<dyn Clock>,
    capacity: usize,
    default_ttl: Duration,
    inner: Mutex<CacheInner>,
}

/// Build the canonical cache key for an operation and its parameters.
///
/// Parameters are sorted by name so call sites cannot produce two keys
/// for the same logical query.
pub fn cache_key(operation: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);
    let mut key = String::from(operation);
    for (name, value) in sorted {
        key.push_str(if key.len() == operation.len() { "?" } else { "&" });
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

impl QueryCache {
    pub fn new(capacity: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            capacity: capacity.max(1),
            default_ttl,
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                insertion_order: VecDeque::new(),
                counters: Counters::default(),
            }),
        }
    }

    /// Look up a key. Returns `None` on miss or expiry; an expired
    /// entry is removed on the spot.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut inner = self.inner.lock().unwrap();

        match inner.map.get(key) {
            Some(entry) if entry.expires_at > now => {
                let value = entry.value.clone();
                inner.counters.hits += 1;
                Some(value)
            }
            Some(_) => {
                inner.map.remove(key);
                inner.counters.expirations += 1;
                inner.counters.misses += 1;
                None
            }
            None => {
                inner.counters.misses += 1;
                None
            }
        }
    }

    /// Insert a value with the given TTL (default TTL when `None`).
    ///
    /// At capacity the oldest-inserted live entry is evicted first.
    /// Re-setting an existing key keeps its original insertion slot.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let key = key.into();
        let expires_at = self.clock.now() + ttl.unwrap_or(self.default_ttl);
        let mut inner = self.inner.lock().unwrap();

        if inner.map.contains_key(&key) {
            inner.map.insert(key, CacheEntry { value, expires_at });
            return;
        }

        while inner.map.len() >= self.capacity {
            let Some(oldest) = inner.insertion_order.pop_front() else {
                break;
            };
            // Stale order entries (expired away earlier) don't count.
            if inner.map.remove(&oldest).is_some() {
                inner.counters.evictions += 1;
            }
        }

        inner.insertion_order.push_back(key.clone());
        inner.map.insert(key, CacheEntry { value, expires_at });
    }

    /// Drop every entry whose key contains `fragment`.
    ///
    /// Used to invalidate a player's cached reads after an
    /// administrative delete.
    pub fn invalidate_matching(&self, fragment: &str) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let doomed: Vec<String> = inner
            .map
            .keys()
            .filter(|k| k.contains(fragment))
            .cloned()
            .collect();
        for key in &doomed {
            inner.map.remove(key);
        }
        doomed.len()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.map.clear();
        inner.insertion_order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap();
        let hits = inner.counters.hits;
        let misses = inner.counters.misses;
        let lookups = hits + misses;
        CacheStats {
            entries: inner.map.len(),
            capacity: self.capacity,
            utilization: inner.map.len() as f64 / self.capacity as f64,
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            evictions: inner.counters.evictions,
            expirations: inner.counters.expirations,
        }
    }
}
