// crates/engine/src/leaderboard.rs
// Leaderboard entry point: store-side per-player aggregation, then the
// deterministic sort/truncate/rank in chronodeck_core.

use chronodeck_core::{leaderboard, LeaderboardEntry};
use chronodeck_db::LeaderboardFilter;

use crate::{EngineResult, StatsEngine};

impl StatsEngine {
    /// Ranked leaderboard, truncated to `limit` after sorting.
    pub async fn leaderboard(
        &self,
        filter: &LeaderboardFilter,
        limit: usize,
    ) -> EngineResult<Vec<LeaderboardEntry>> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(category) = &filter.category {
            params.push(("category", category.clone()));
        }
        if let Some(from) = filter.ended_from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = filter.ended_to {
            params.push(("to", to.to_string()));
        }

        self.run_cached("leaderboard", &params, || async {
            let entries = self.db().leaderboard_aggregates(filter).await?;
            Ok(leaderboard::rank_entries(entries, limit))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chronodeck_core::{ManualClock, NewMove, NewSession, SessionPatch, SessionStatus};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{DetailPolicy, EngineConfig, StatsEngine};
    use chronodeck_db::Database;

    /// One completed session with the given score and accuracy shape.
    async fn played(db: &Database, player: &str, score: i64, correct: i64, total: i64) {
        let session = db
            .create_session(&NewSession {
                player_name: player.to_string(),
                difficulty: 2,
                card_count: 10,
                categories: vec!["science".to_string()],
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

    #[tokio::test]
    async fn test_accuracy_breaks_ties_deterministically() {
        let db = Database::new_in_memory().await.unwrap();
        // A: avg 200, accuracy 50; B: avg 200, accuracy 80; C: avg 150, accuracy 99+.
        played(&db, "alice", 200, 5, 10).await;
        played(&db, "bob", 200, 8, 10).await;
        played(&db, "carol", 150, 99, 100).await;

        let engine = StatsEngine::with_parts(
            db,
            EngineConfig::default(),
            Arc::new(DetailPolicy),
            Arc::new(ManualClock::new()),
        );
        let entries = engine
            .leaderboard(&LeaderboardFilter::default(), 10)
            .await
            .unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.player_name.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice", "carol"]);
        let ranks: Vec<i64> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_limit_applies_after_sorting() {
        let db = Database::new_in_memory().await.unwrap();
        played(&db, "low", 10, 1, 10).await;
        played(&db, "high", 300, 9, 10).await;

        let engine = StatsEngine::with_parts(
            db,
            EngineConfig::default(),
            Arc::new(DetailPolicy),
            Arc::new(ManualClock::new()),
        );
        let entries = engine
            .leaderboard(&LeaderboardFilter::default(), 1)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player_name, "high");
    }
}
