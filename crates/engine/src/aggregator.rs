// crates/engine/src/aggregator.rs
//! Player and bucket statistics behind the dual-strategy seam.
//!
//! One polymorphic [`AggregationStrategy`] replaces the conditional
//! branches a strategy decision would otherwise scatter through every
//! method: the policy collaborator picks an implementation once per
//! call, and the rest of the path is strategy-agnostic.

use async_trait::async_trait;

use chronodeck_core::{stats, BucketStatistics, PlayerStatistics, SessionMoveStats};
use chronodeck_db::Database;

use crate::{EngineResult, StatsDetail, StatsEngine};

#[async_trait]
trait AggregationStrategy: Send + Sync {
    async fn player_statistics(
        &self,
        db: &Database,
        player_name: &str,
    ) -> EngineResult<PlayerStatistics>;
}

/// Fetch the player's sessions and fold them in process.
struct RowAggregation;

#[async_trait]
impl AggregationStrategy for RowAggregation {
    async fn player_statistics(
        &self,
        db: &Database,
        player_name: &str,
    ) -> EngineResult<PlayerStatistics> {
        let sessions = db.sessions_for_player(player_name).await?;
        Ok(stats::player_statistics(player_name, &sessions))
    }
}

/// Push the aggregation into the store's grouping/statistical
/// functions; one row per figure instead of one per session.
struct StoreAggregation;

#[async_trait]
impl AggregationStrategy for StoreAggregation {
    async fn player_statistics(
        &self,
        db: &Database,
        player_name: &str,
    ) -> EngineResult<PlayerStatistics> {
        Ok(db.player_statistics_store(player_name).await?)
    }
}

impl StatsEngine {
    /// Per-player summary statistics at the requested detail level.
    pub async fn player_statistics(
        &self,
        player_name: &str,
        detail: StatsDetail,
    ) -> EngineResult<PlayerStatistics> {
        let store_side = self.policy().use_store_aggregation("player_stats", detail);
        let strategy: &dyn AggregationStrategy = if store_side {
            &StoreAggregation
        } else {
            &RowAggregation
        };

        let detail_param = if store_side { "advanced" } else { "basic" };
        let params = [
            ("player", player_name.to_string()),
            ("detail", detail_param.to_string()),
        ];
        self.run_cached("player_statistics", &params, || {
            strategy.player_statistics(self.db(), player_name)
        })
        .await
    }

    /// Per-category breakdown of a player's sessions. A session
    /// credits every category it belongs to in full.
    pub async fn category_statistics(
        &self,
        player_name: &str,
    ) -> EngineResult<Vec<BucketStatistics>> {
        self.bucket_statistics("category_statistics", player_name, stats::group_by_category)
            .await
    }

    /// Per-difficulty breakdown of a player's sessions.
    pub async fn difficulty_statistics(
        &self,
        player_name: &str,
    ) -> EngineResult<Vec<BucketStatistics>> {
        self.bucket_statistics(
            "difficulty_statistics",
            player_name,
            stats::group_by_difficulty,
        )
        .await
    }

    /// Per-UTC-day breakdown over sessions with an end time.
    pub async fn daily_statistics(&self, player_name: &str) -> EngineResult<Vec<BucketStatistics>> {
        self.bucket_statistics("daily_statistics", player_name, stats::group_by_day)
            .await
    }

    /// Per-ISO-week breakdown over sessions with an end time.
    pub async fn weekly_statistics(
        &self,
        player_name: &str,
    ) -> EngineResult<Vec<BucketStatistics>> {
        self.bucket_statistics("weekly_statistics", player_name, stats::group_by_week)
            .await
    }

    // Bucket breakdowns always fold rows: each shares one fetched
    // session set, and the store has no single grouped query for the
    // multi-credit category rule.
    async fn bucket_statistics(
        &self,
        operation: &'static str,
        player_name: &str,
        group: fn(&[chronodeck_core::Session]) -> Vec<BucketStatistics>,
    ) -> EngineResult<Vec<BucketStatistics>> {
        let params = [("player", player_name.to_string())];
        self.run_cached(operation, &params, || async {
            let sessions = self.db().sessions_for_player(player_name).await?;
            Ok(group(&sessions))
        })
        .await
    }

    /// Move-level aggregate for one session, computed store-side.
    pub async fn session_move_statistics(
        &self,
        session_id: &str,
    ) -> EngineResult<SessionMoveStats> {
        let params = [("session", session_id.to_string())];
        self.run_cached("session_move_statistics", &params, || async {
            Ok(self.db().session_move_stats(session_id).await?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chronodeck_core::{ManualClock, NewMove, NewSession, SessionPatch, SessionStatus};
    use pretty_assertions::assert_eq;

    use crate::{EngineConfig, StaticPolicy, StatsEngine};
    use chronodeck_db::Database;

    async fn seeded_db() -> Database {
        let db = Database::new_in_memory().await.unwrap();
        for (score, correct, total, categories) in [
            (100, 2, 3, vec!["science", "politics"]),
            (200, 3, 3, vec!["science"]),
            (0, 1, 4, vec!["art"]),
        ] {
            let session = db
                .create_session(&NewSession {
                    player_name: "ada".to_string(),
                    difficulty: 2,
                    card_count: 10,
                    categories: categories.iter().map(|c| c.to_string()).collect(),
                })
                .await
                .unwrap();
            for number in 1..=total {
                db.record_move(&NewMove {
                    session_id: session.id.clone(),
                    card_id: format!("card-{number}"),
                    position_before: None,
                    position_after: number - 1,
                    is_correct: number <= correct,
                    move_number: number,
                    time_taken_seconds: None,
                })
                .await
                .unwrap();
            }
            db.update_session_status(
                &session.id,
                SessionStatus::Completed,
                &SessionPatch {
                    score: Some(score),
                    ended_at: Some(session.started_at + 60),
                    duration_seconds: Some(60),
                },
            )
            .await
            .unwrap();
        }
        db
    }

    fn engine_with_policy(db: Database, store_side: bool) -> StatsEngine {
        StatsEngine::with_parts(
            db,
            EngineConfig::default(),
            Arc::new(StaticPolicy(store_side)),
            Arc::new(ManualClock::new()),
        )
    }

    #[tokio::test]
    async fn test_strategies_agree_on_shared_fields() {
        let db = seeded_db().await;
        let row_engine = engine_with_policy(db.clone(), false);
        let store_engine = engine_with_policy(db, true);

        let mut row = row_engine
            .player_statistics("ada", crate::StatsDetail::Basic)
            .await
            .unwrap();
        let store = store_engine
            .player_statistics("ada", crate::StatsDetail::Advanced)
            .await
            .unwrap();

        assert!(row.distribution.is_none());
        assert!(store.distribution.is_some());
        // Compare everything but the advanced-only figures.
        row.distribution = store.distribution.clone();
        assert_eq!(row, store);
    }

    #[tokio::test]
    async fn test_category_breakdown_multi_credits() {
        let db = seeded_db().await;
        let engine = engine_with_policy(db, false);

        let buckets = engine.category_statistics("ada").await.unwrap();
        let keys: Vec<&str> = buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(keys, vec!["art", "politics", "science"]);

        let science = buckets.iter().find(|b| b.bucket == "science").unwrap();
        assert_eq!(science.games_played, 2);
        assert_eq!(science.total_score, 300);
        // 4 credits from 3 sessions.
        let credits: i64 = buckets.iter().map(|b| b.games_played).sum();
        assert_eq!(credits, 4);
    }

    #[tokio::test]
    async fn test_weekly_breakdown_groups_by_iso_week() {
        let db = seeded_db().await;
        let engine = engine_with_policy(db, false);

        let buckets = engine.weekly_statistics("ada").await.unwrap();
        // All three sessions ended within seconds of each other.
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].games_played, 3);
    }

    #[tokio::test]
    async fn test_session_move_statistics_roundtrip() {
        let db = seeded_db().await;
        let sessions = db.sessions_for_player("ada").await.unwrap();
        let engine = engine_with_policy(db, false);

        let target = sessions
            .iter()
            .find(|s| s.total_moves == 3 && s.correct_moves == 2)
            .unwrap();
        let stats = engine.session_move_statistics(&target.id).await.unwrap();
        assert_eq!(stats.total_moves, 3);
        assert_eq!(stats.accuracy, 66.67);
    }
}
