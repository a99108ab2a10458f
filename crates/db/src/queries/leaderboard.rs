// crates/db/src/queries/leaderboard.rs
// Per-player leaderboard aggregation, pushed into the store.

use chronodeck_core::{accuracy_pct, round2, LeaderboardEntry};

use crate::{Database, LedgerResult};

/// Optional leaderboard scoping. `category` matches sessions whose
/// category set contains the label; the window bounds apply to
/// `ended_at`.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardFilter {
    pub category: Option<String>,
    pub ended_from: Option<i64>,
    pub ended_to: Option<i64>,
}

impl Database {
    /// Aggregate one row per player over completed sessions with a
    /// positive score. Rows come back unranked; ordering and
    /// truncation are the ranker's job so a limit can never hide a
    /// better-placed player.
    pub async fn leaderboard_aggregates(
        &self,
        filter: &LeaderboardFilter,
    ) -> LedgerResult<Vec<LeaderboardEntry>> {
        let mut sql = String::from(
            r#"
            SELECT
                player_name,
                COUNT(*),
                COALESCE(AVG(CAST(score AS REAL)), 0),
                COALESCE(MAX(score), 0),
                COALESCE(SUM(correct_moves), 0),
                COALESCE(SUM(total_moves), 0)
            FROM sessions
            WHERE status = 'completed' AND score > 0
            "#,
        );
        if filter.category.is_some() {
            // categories is a JSON array column; containment via json_each.
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(sessions.categories) \
                 WHERE json_each.value = ?)",
            );
        }
        if filter.ended_from.is_some() {
            sql.push_str(" AND ended_at >= ?");
        }
        if filter.ended_to.is_some() {
            sql.push_str(" AND ended_at <= ?");
        }
        sql.push_str(" GROUP BY player_name");

        let mut query = sqlx::query_as::<_, (String, i64, f64, i64, i64, i64)>(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }
        if let Some(from) = filter.ended_from {
            query = query.bind(from);
        }
        if let Some(to) = filter.ended_to {
            query = query.bind(to);
        }

        let rows = query.fetch_all(self.pool()).await?;

        Ok(rows
            .into_iter()
            .map(
                |(player_name, games_played, avg_score, best_score, correct, total)| {
                    LeaderboardEntry {
                        player_name,
                        games_played,
                        avg_score: round2(avg_score),
                        best_score,
                        total_correct_moves: correct,
                        total_moves: total,
                        accuracy_percentage: accuracy_pct(correct, total),
                        rank: 0,
                    }
                },
            )
            .collect())
    }
}
