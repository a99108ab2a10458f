// crates/engine/src/lib.rs
//! Read-side composition: every aggregation call is strategy-selected,
//! timed by the performance monitor, and served through the TTL query
//! cache. Failures are logged and propagated, never cached.

mod aggregator;
mod config;
mod error;
mod leaderboard;
mod policy;
mod progression;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use policy::{AggregationPolicy, DetailPolicy, StaticPolicy, StatsDetail};

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use chronodeck_core::{
    cache_key, CacheStats, Clock, LedgerOverview, OperationMetrics, PerformanceMonitor,
    QueryCache, SystemClock,
};
use chronodeck_db::Database;

pub struct StatsEngine {
    db: Database,
    cache: QueryCache,
    monitor: PerformanceMonitor,
    policy: Arc<dyn AggregationPolicy>,
    clock: Arc<dyn Clock>,
}

impl StatsEngine {
    /// Engine with default config, policy, and the system clock.
    pub fn new(db: Database) -> Self {
        Self::with_parts(
            db,
            EngineConfig::default(),
            Arc::new(DetailPolicy),
            Arc::new(SystemClock),
        )
    }

    /// Fully injected constructor; tests drive a manual clock and a
    /// fixed policy through here.
    pub fn with_parts(
        db: Database,
        config: EngineConfig,
        policy: Arc<dyn AggregationPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = QueryCache::new(config.cache_capacity, config.cache_ttl(), clock.clone());
        let monitor = PerformanceMonitor::new(
            config.slow_query_threshold(),
            config.metrics_retention(),
            clock.clone(),
        );
        Self {
            db,
            cache,
            monitor,
            policy,
            clock,
        }
    }

    /// The underlying ledger, for write-path calls.
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub(crate) fn policy(&self) -> &dyn AggregationPolicy {
        self.policy.as_ref()
    }

    /// Ledger-wide totals (cached like every other read).
    pub async fn overview(&self) -> EngineResult<LedgerOverview> {
        self.run_cached("overview", &[], || async {
            Ok(self.db.overview().await?)
        })
        .await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn operation_metrics(&self) -> Vec<OperationMetrics> {
        self.monitor.operation_metrics()
    }

    /// Drop a player's cached reads, e.g. after an administrative
    /// session delete.
    pub fn invalidate_player(&self, player_name: &str) -> usize {
        self.cache.invalidate_matching(&format!("player={player_name}"))
    }

    /// Serve from cache or execute `f` under the monitor's timer.
    ///
    /// A failed call is recorded and propagated; its result never
    /// enters the cache.
    pub(crate) async fn run_cached<T, F, Fut>(
        &self,
        operation: &'static str,
        params: &[(&str, String)],
        f: F,
    ) -> EngineResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        let key = cache_key(operation, params);
        if let Some(value) = self.cache.get(&key) {
            debug!(operation, key = %key, "cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        let start = self.clock.now();
        match f().await {
            Ok(result) => {
                let elapsed = self.clock.now().duration_since(start);
                self.monitor.observe_success(operation, elapsed);
                self.cache.set(key, serde_json::to_value(&result)?, None);
                Ok(result)
            }
            Err(err) => {
                let elapsed = self.clock.now().duration_since(start);
                self.monitor.observe_failure(operation, elapsed, &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronodeck_core::ManualClock;
    use chronodeck_db::LedgerError;
    use std::time::Duration;

    async fn engine_with_clock() -> (StatsEngine, ManualClock) {
        let db = Database::new_in_memory().await.unwrap();
        let clock = ManualClock::new();
        let engine = StatsEngine::with_parts(
            db,
            EngineConfig::default(),
            Arc::new(DetailPolicy),
            Arc::new(clock.clone()),
        );
        (engine, clock)
    }

    #[tokio::test]
    async fn test_second_call_is_a_cache_hit() {
        let (engine, _clock) = engine_with_clock().await;

        engine.overview().await.unwrap();
        engine.overview().await.unwrap();

        let stats = engine.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        // Only the first call reached the monitor.
        let metrics = engine.operation_metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].calls, 1);
    }

    #[tokio::test]
    async fn test_cached_result_expires_after_ttl() {
        let (engine, clock) = engine_with_clock().await;

        engine.overview().await.unwrap();
        clock.advance(Duration::from_secs(61));
        engine.overview().await.unwrap();

        let metrics = engine.operation_metrics();
        assert_eq!(metrics[0].calls, 2, "expired entry must recompute");
    }

    #[tokio::test]
    async fn test_failures_are_recorded_and_never_cached() {
        let (engine, _clock) = engine_with_clock().await;

        for _ in 0..2 {
            let err = engine.session_move_statistics("ghost").await.unwrap_err();
            assert!(matches!(
                err,
                EngineError::Ledger(LedgerError::NotFound { .. })
            ));
        }

        let metrics = engine.operation_metrics();
        let m = metrics
            .iter()
            .find(|m| m.operation == "session_move_statistics")
            .unwrap();
        assert_eq!(m.calls, 2, "second call must re-execute, not hit cache");
        assert_eq!(m.errors, 2);
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_invalidate_player_drops_only_their_keys() {
        let (engine, _clock) = engine_with_clock().await;
        engine
            .player_statistics("ada", StatsDetail::Basic)
            .await
            .unwrap();
        engine
            .player_statistics("bob", StatsDetail::Basic)
            .await
            .unwrap();

        assert_eq!(engine.invalidate_player("ada"), 1);
        assert_eq!(engine.cache_stats().entries, 1);
    }
}
