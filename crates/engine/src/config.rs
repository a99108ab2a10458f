// crates/engine/src/config.rs
use std::time::Duration;

use serde::Deserialize;

/// Tunables for the read side. Deserializable so a host process can
/// load it from its own config file; `Default` matches the documented
/// constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of cached query results.
    pub cache_capacity: usize,
    /// Default TTL for cached results, in seconds.
    pub cache_ttl_secs: u64,
    /// Calls slower than this are logged as slow queries, in ms.
    pub slow_query_ms: u64,
    /// How long call records count toward operation metrics, in seconds.
    pub metrics_retention_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 100,
            cache_ttl_secs: 60,
            slow_query_ms: 1000,
            metrics_retention_secs: 300,
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_ms)
    }

    pub fn metrics_retention(&self) -> Duration {
        Duration::from_secs(self.metrics_retention_secs)
    }
}
