// crates/engine/src/policy.rs
//! The feature-policy collaborator: which computation strategy a
//! metric family gets at a requested detail level. Owned by
//! configuration, consulted (not decided) by the aggregator.

use serde::{Deserialize, Serialize};

/// Requested depth of a statistics call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsDetail {
    /// Sums/averages/extrema only.
    Basic,
    /// Adds percentile/variance figures.
    Advanced,
}

/// Pure decision function: should this call push aggregation into the
/// store instead of folding rows in process?
pub trait AggregationPolicy: Send + Sync {
    fn use_store_aggregation(&self, metric_family: &str, detail: StatsDetail) -> bool;
}

/// Default policy: advanced requests go store-side (percentiles per
/// row in application code would be wasteful), everything else folds
/// fetched rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetailPolicy;

impl AggregationPolicy for DetailPolicy {
    fn use_store_aggregation(&self, _metric_family: &str, detail: StatsDetail) -> bool {
        detail == StatsDetail::Advanced
    }
}

/// Fixed-answer policy for tests and forced rollouts.
#[derive(Debug, Clone, Copy)]
pub struct StaticPolicy(pub bool);

impl AggregationPolicy for StaticPolicy {
    fn use_store_aggregation(&self, _metric_family: &str, _detail: StatsDetail) -> bool {
        self.0
    }
}
