// crates/db/src/queries/stats.rs
// Store-aggregation statistics: grouping and statistical functions
// pushed into SQLite instead of per-row computation in application
// code. Figures must agree with chronodeck_core::stats on every field
// both strategies produce.

use chronodeck_core::{
    accuracy_pct, round2, win_rate_pct, LedgerOverview, PlayerStatistics, ScoreDistribution,
};

use crate::{Database, LedgerResult};

impl Database {
    /// Full player summary computed inside the store, including the
    /// percentile/variance figures row aggregation skips.
    ///
    /// Returns the all-zero variant when the player has no sessions.
    pub async fn player_statistics_store(&self, player_name: &str) -> LedgerResult<PlayerStatistics> {
        let (
            games_played,
            games_won,
            games_lost,
            games_abandoned,
            total_score,
            total_moves,
            correct_moves,
            incorrect_moves,
            play_time_seconds,
            timed_games,
            best_score,
            worst_score,
            first_played_at,
            last_played_at,
        ): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
            Option<i64>,
            Option<i64>,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'completed' AND score > 0 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'completed' AND score = 0 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'abandoned' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(score), 0),
                COALESCE(SUM(total_moves), 0),
                COALESCE(SUM(correct_moves), 0),
                COALESCE(SUM(incorrect_moves), 0),
                COALESCE(SUM(duration_seconds), 0),
                COUNT(duration_seconds),
                COALESCE(MAX(CASE WHEN score > 0 THEN score END), 0),
                COALESCE(MIN(CASE WHEN score > 0 THEN score END), 0),
                MIN(started_at),
                MAX(started_at)
            FROM sessions
            WHERE player_name = ?1
            "#,
        )
        .bind(player_name)
        .fetch_one(self.pool())
        .await?;

        if games_played == 0 {
            return Ok(PlayerStatistics::empty(player_name));
        }

        let distribution = self.score_distribution(player_name).await?;

        Ok(PlayerStatistics {
            player_name: player_name.to_string(),
            total_games_played: games_played,
            total_games_won: games_won,
            total_games_lost: games_lost,
            total_games_abandoned: games_abandoned,
            total_score,
            total_moves,
            total_correct_moves: correct_moves,
            total_incorrect_moves: incorrect_moves,
            total_play_time_seconds: play_time_seconds,
            average_score_per_game: round2(total_score as f64 / games_played as f64),
            average_accuracy: accuracy_pct(correct_moves, total_moves),
            best_score,
            worst_score,
            average_game_duration_seconds: if timed_games == 0 {
                0.0
            } else {
                round2(play_time_seconds as f64 / timed_games as f64)
            },
            win_rate: win_rate_pct(games_won, games_played),
            last_played_at,
            first_played_at,
            distribution,
        })
    }

    /// Median/p90/stddev/variance over a player's won games.
    ///
    /// SQLite has no percentile or stddev aggregates, so variance comes
    /// from sum-of-squares and the percentiles from ordered OFFSET
    /// lookups -- still store-side, one row per figure.
    async fn score_distribution(
        &self,
        player_name: &str,
    ) -> LedgerResult<Option<ScoreDistribution>> {
        let (scored_games, avg_score, avg_square): (i64, f64, f64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(AVG(CAST(score AS REAL)), 0),
                COALESCE(AVG(CAST(score AS REAL) * CAST(score AS REAL)), 0)
            FROM sessions
            WHERE player_name = ?1 AND status = 'completed' AND score > 0
            "#,
        )
        .bind(player_name)
        .fetch_one(self.pool())
        .await?;

        if scored_games == 0 {
            return Ok(None);
        }

        let variance = (avg_square - avg_score * avg_score).max(0.0);
        let median_score = self
            .score_at_offset(player_name, (scored_games - 1) / 2)
            .await?;
        let p90_score = self
            .score_at_offset(player_name, (scored_games - 1) * 9 / 10)
            .await?;

        Ok(Some(ScoreDistribution {
            median_score,
            p90_score,
            score_stddev: round2(variance.sqrt()),
            score_variance: round2(variance),
        }))
    }

    async fn score_at_offset(&self, player_name: &str, offset: i64) -> LedgerResult<i64> {
        let (score,): (i64,) = sqlx::query_as(
            r#"
            SELECT score FROM sessions
            WHERE player_name = ?1 AND status = 'completed' AND score > 0
            ORDER BY score ASC
            LIMIT 1 OFFSET ?2
            "#,
        )
        .bind(player_name)
        .bind(offset)
        .fetch_one(self.pool())
        .await?;
        Ok(score)
    }

    /// Ledger-wide totals for a dashboard-style summary.
    pub async fn overview(&self) -> LedgerResult<LedgerOverview> {
        let (total_sessions, active, completed, abandoned, players): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'abandoned' THEN 1 ELSE 0 END), 0),
                    COUNT(DISTINCT player_name)
                FROM sessions
                "#,
            )
            .fetch_one(self.pool())
            .await?;

        let (total_moves,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM moves")
            .fetch_one(self.pool())
            .await?;

        Ok(LedgerOverview {
            total_sessions,
            active_sessions: active,
            completed_sessions: completed,
            abandoned_sessions: abandoned,
            total_players: players,
            total_moves,
        })
    }
}

#[cfg(test)]
mod tests {
    use chronodeck_core::{NewMove, NewSession, SessionPatch, SessionStatus};
    use pretty_assertions::assert_eq;

    use crate::Database;

    async fn finished_session(db: &Database, player: &str, score: i64, correct: i64, total: i64) {
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
                ended_at: Some(session.started_at + 300),
                duration_seconds: Some(300),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_store_stats_for_unknown_player_is_empty_variant() {
        let db = Database::new_in_memory().await.unwrap();
        let stats = db.player_statistics_store("nobody").await.unwrap();
        assert_eq!(stats.total_games_played, 0);
        assert!(stats.first_played_at.is_none());
        assert!(stats.distribution.is_none());
    }

    #[tokio::test]
    async fn test_store_stats_counts_and_rates() {
        let db = Database::new_in_memory().await.unwrap();
        finished_session(&db, "ada", 100, 2, 3).await;
        finished_session(&db, "ada", 200, 3, 3).await;
        finished_session(&db, "ada", 0, 0, 3).await; // a lost game

        let stats = db.player_statistics_store("ada").await.unwrap();
        assert_eq!(stats.total_games_played, 3);
        assert_eq!(stats.total_games_won, 2);
        assert_eq!(stats.total_games_lost, 1);
        assert_eq!(stats.total_score, 300);
        assert_eq!(stats.average_score_per_game, 100.0);
        assert_eq!(stats.best_score, 200);
        assert_eq!(stats.worst_score, 100, "lost game must not be the minimum");
        assert_eq!(stats.total_moves, 9);
        assert_eq!(stats.total_correct_moves, 5);
        assert_eq!(stats.average_accuracy, 55.56);
        assert_eq!(stats.win_rate, 66.67);
        assert_eq!(stats.total_play_time_seconds, 900);
        assert_eq!(stats.average_game_duration_seconds, 300.0);
    }

    #[tokio::test]
    async fn test_score_distribution_median_and_spread() {
        let db = Database::new_in_memory().await.unwrap();
        for score in [100, 200, 300] {
            finished_session(&db, "ada", score, 2, 3).await;
        }

        let stats = db.player_statistics_store("ada").await.unwrap();
        let dist = stats.distribution.expect("three scored games");
        assert_eq!(dist.median_score, 200);
        assert_eq!(dist.p90_score, 200); // offset (3-1)*9/10 = 1
        // population variance of {100,200,300} = 6666.67
        assert_eq!(dist.score_variance, 6666.67);
        assert_eq!(dist.score_stddev, 81.65);
    }

    #[tokio::test]
    async fn test_overview_totals() {
        let db = Database::new_in_memory().await.unwrap();
        finished_session(&db, "ada", 100, 2, 3).await;
        finished_session(&db, "bob", 50, 1, 2).await;
        db.create_session(&NewSession {
            player_name: "ada".to_string(),
            difficulty: 1,
            card_count: 5,
            categories: vec!["politics".to_string()],
        })
        .await
        .unwrap();

        let overview = db.overview().await.unwrap();
        assert_eq!(overview.total_sessions, 3);
        assert_eq!(overview.active_sessions, 1);
        assert_eq!(overview.completed_sessions, 2);
        assert_eq!(overview.abandoned_sessions, 0);
        assert_eq!(overview.total_players, 2);
        assert_eq!(overview.total_moves, 5);
    }
}
