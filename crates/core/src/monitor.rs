// crates/core/src/monitor.rs
//! Query performance monitoring for the read side.
//!
//! Every aggregation call is timed; slow calls are flagged, failures
//! are logged and counted, and per-operation duration rollups are kept
//! over a bounded retention window. Durations are also emitted through
//! the `metrics` facade so a host process can export them.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use metrics::{counter, histogram};

use crate::clock::Clock;

/// Calls slower than this are logged as slow queries.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(1000);

/// Default horizon after which call records stop counting.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(300);

/// Per-operation duration/error rollup over the retention window.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OperationMetrics {
    pub operation: String,
    pub calls: u64,
    pub errors: u64,
    pub slow_calls: u64,
    pub total_ms: u64,
    pub avg_ms: f64,
    pub min_ms: u64,
    pub max_ms: u64,
}

struct CallRecord {
    duration: Duration,
    recorded_at: Instant,
    failed: bool,
}

pub struct PerformanceMonitor {
    clock: Arc<dyn Clock>,
    slow_threshold: Duration,
    retention: Duration,
    records: Mutex<HashMap<String, Vec<CallRecord>>>,
}

impl PerformanceMonitor {
    pub fn new(slow_threshold: Duration, retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slow_threshold,
            retention,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Record a successful call.
    pub fn observe_success(&self, operation: &str, duration: Duration) {
        self.record(operation, duration, false);
    }

    /// Record a failed call. The failure is logged here with its
    /// operation context; the error itself still propagates to the
    /// caller unchanged.
    pub fn observe_failure(&self, operation: &str, duration: Duration, error: &dyn Display) {
        tracing::error!(
            operation = operation,
            duration_ms = duration.as_millis() as u64,
            error = %error,
            "aggregation call failed"
        );
        self.record(operation, duration, true);
    }

    fn record(&self, operation: &str, duration: Duration, failed: bool) {
        if duration > self.slow_threshold {
            tracing::warn!(
                operation = operation,
                duration_ms = duration.as_millis() as u64,
                threshold_ms = self.slow_threshold.as_millis() as u64,
                "slow aggregation call"
            );
        }

        let status = if failed { "error" } else { "ok" };
        counter!("aggregator_calls_total", "operation" => operation.to_string(), "status" => status)
            .increment(1);
        histogram!("aggregator_call_duration_seconds", "operation" => operation.to_string())
            .record(duration.as_secs_f64());

        let now = self.clock.now();
        let mut records = self.records.lock().unwrap();
        let entries = records.entry(operation.to_string()).or_default();
        Self::evict_stale(entries, now, self.retention);
        entries.push(CallRecord {
            duration,
            recorded_at: now,
            failed,
        });
    }

    fn evict_stale(entries: &mut Vec<CallRecord>, now: Instant, retention: Duration) {
        entries.retain(|r| now.duration_since(r.recorded_at) <= retention);
    }

    /// Rollups for every operation seen inside the retention window,
    /// sorted by operation name for stable output.
    pub fn operation_metrics(&self) -> Vec<OperationMetrics> {
        let now = self.clock.now();
        let mut records = self.records.lock().unwrap();

        let mut out = Vec::new();
        for (operation, entries) in records.iter_mut() {
            Self::evict_stale(entries, now, self.retention);
            if entries.is_empty() {
                continue;
            }
            let calls = entries.len() as u64;
            let errors = entries.iter().filter(|r| r.failed).count() as u64;
            let slow_calls = entries
                .iter()
                .filter(|r| r.duration > self.slow_threshold)
                .count() as u64;
            let total_ms: u64 = entries.iter().map(|r| r.duration.as_millis() as u64).sum();
            let min_ms = entries
                .iter()
                .map(|r| r.duration.as_millis() as u64)
                .min()
                .unwrap_or(0);
            let max_ms = entries
                .iter()
                .map(|r| r.duration.as_millis() as u64)
                .max()
                .unwrap_or(0);

            out.push(OperationMetrics {
                operation: operation.clone(),
                calls,
                errors,
                slow_calls,
                total_ms,
                avg_ms: total_ms as f64 / calls as f64,
                min_ms,
                max_ms,
            });
        }
        out.sort_by(|a, b| a.operation.cmp(&b.operation));
        out
    }
}
