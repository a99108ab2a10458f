// crates/core/src/stats.rs
//! Row-aggregation statistics: formulas, the per-player accumulator,
//! and bucketed (category/difficulty/daily/weekly) grouping.
//!
//! The store-aggregation strategy in `chronodeck-db` must agree with
//! the figures produced here for every shared field; the tests in
//! `chronodeck-engine` hold both strategies to that.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike};

use crate::types::{BucketStatistics, PlayerStatistics, Session, SessionStatus};

/// Round to 2 decimal places for external presentation.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `correct / total * 100`, defined as 0 when `total` is 0.
pub fn accuracy_pct(correct: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(correct as f64 / total as f64 * 100.0)
}

/// `won / played * 100`, defined as 0 when `played` is 0.
pub fn win_rate_pct(won: i64, played: i64) -> f64 {
    if played == 0 {
        return 0.0;
    }
    round2(won as f64 / played as f64 * 100.0)
}

/// A game counts as won iff it completed with a positive score.
pub fn is_won(session: &Session) -> bool {
    session.status == SessionStatus::Completed && session.score > 0
}

/// Accumulated per-player state. Feed sessions via
/// [`add`](PlayerStatsAccumulator::add), then call
/// [`finish`](PlayerStatsAccumulator::finish).
#[derive(Debug, Default)]
pub struct PlayerStatsAccumulator {
    games_played: i64,
    games_won: i64,
    games_lost: i64,
    games_abandoned: i64,
    total_score: i64,
    total_moves: i64,
    correct_moves: i64,
    incorrect_moves: i64,
    play_time_seconds: i64,
    timed_games: i64,
    best_score: i64,
    worst_score: Option<i64>,
    first_played_at: Option<i64>,
    last_played_at: Option<i64>,
}

impl PlayerStatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, session: &Session) {
        self.games_played += 1;
        match session.status {
            SessionStatus::Completed => {
                if session.score > 0 {
                    self.games_won += 1;
                } else {
                    self.games_lost += 1;
                }
            }
            SessionStatus::Abandoned => self.games_abandoned += 1,
            SessionStatus::Active => {}
        }

        self.total_score += session.score;
        self.total_moves += session.total_moves;
        self.correct_moves += session.correct_moves;
        self.incorrect_moves += session.incorrect_moves;

        if let Some(duration) = session.duration_seconds {
            self.play_time_seconds += duration;
            self.timed_games += 1;
        }

        // Extrema only over positive scores: a 0-score game is an
        // unplayed/lost game, not the true minimum.
        if session.score > 0 {
            self.best_score = self.best_score.max(session.score);
            self.worst_score = Some(match self.worst_score {
                Some(worst) => worst.min(session.score),
                None => session.score,
            });
        }

        self.first_played_at = Some(match self.first_played_at {
            Some(first) => first.min(session.started_at),
            None => session.started_at,
        });
        self.last_played_at = Some(match self.last_played_at {
            Some(last) => last.max(session.started_at),
            None => session.started_at,
        });
    }

    pub fn finish(self, player_name: impl Into<String>) -> PlayerStatistics {
        let average_score_per_game = if self.games_played == 0 {
            0.0
        } else {
            round2(self.total_score as f64 / self.games_played as f64)
        };
        let average_game_duration_seconds = if self.timed_games == 0 {
            0.0
        } else {
            round2(self.play_time_seconds as f64 / self.timed_games as f64)
        };

        PlayerStatistics {
            player_name: player_name.into(),
            total_games_played: self.games_played,
            total_games_won: self.games_won,
            total_games_lost: self.games_lost,
            total_games_abandoned: self.games_abandoned,
            total_score: self.total_score,
            total_moves: self.total_moves,
            total_correct_moves: self.correct_moves,
            total_incorrect_moves: self.incorrect_moves,
            total_play_time_seconds: self.play_time_seconds,
            average_score_per_game,
            average_accuracy: accuracy_pct(self.correct_moves, self.total_moves),
            best_score: self.best_score,
            worst_score: self.worst_score.unwrap_or(0),
            average_game_duration_seconds,
            win_rate: win_rate_pct(self.games_won, self.games_played),
            last_played_at: self.last_played_at,
            first_played_at: self.first_played_at,
            distribution: None,
        }
    }
}

/// Fold a player's sessions into their summary statistics.
pub fn player_statistics(player_name: &str, sessions: &[Session]) -> PlayerStatistics {
    let mut acc = PlayerStatsAccumulator::new();
    for session in sessions {
        acc.add(session);
    }
    acc.finish(player_name)
}

// ============================================================================
// Bucketed grouping
// ============================================================================

#[derive(Debug, Default)]
struct BucketAccumulator {
    games_played: i64,
    games_won: i64,
    total_score: i64,
    total_moves: i64,
    correct_moves: i64,
    best_score: i64,
}

impl BucketAccumulator {
    fn add(&mut self, session: &Session) {
        self.games_played += 1;
        if is_won(session) {
            self.games_won += 1;
        }
        self.total_score += session.score;
        self.total_moves += session.total_moves;
        self.correct_moves += session.correct_moves;
        self.best_score = self.best_score.max(session.score);
    }

    fn finish(self, bucket: String) -> BucketStatistics {
        let average_score = if self.games_played == 0 {
            0.0
        } else {
            round2(self.total_score as f64 / self.games_played as f64)
        };
        BucketStatistics {
            bucket,
            games_played: self.games_played,
            games_won: self.games_won,
            total_score: self.total_score,
            total_moves: self.total_moves,
            correct_moves: self.correct_moves,
            average_score,
            accuracy: accuracy_pct(self.correct_moves, self.total_moves),
            win_rate: win_rate_pct(self.games_won, self.games_played),
            best_score: self.best_score,
        }
    }
}

fn finish_buckets(buckets: BTreeMap<String, BucketAccumulator>) -> Vec<BucketStatistics> {
    buckets
        .into_iter()
        .map(|(key, acc)| acc.finish(key))
        .collect()
}

/// Group by category label.
///
/// A session credits every category it belongs to in full, so bucketed
/// game counts can exceed the session count. Observed source behavior,
/// kept as-is.
pub fn group_by_category(sessions: &[Session]) -> Vec<BucketStatistics> {
    let mut buckets: BTreeMap<String, BucketAccumulator> = BTreeMap::new();
    for session in sessions {
        for category in &session.categories {
            buckets.entry(category.clone()).or_default().add(session);
        }
    }
    finish_buckets(buckets)
}

/// Group by difficulty level.
pub fn group_by_difficulty(sessions: &[Session]) -> Vec<BucketStatistics> {
    let mut buckets: BTreeMap<String, BucketAccumulator> = BTreeMap::new();
    for session in sessions {
        buckets
            .entry(session.difficulty.to_string())
            .or_default()
            .add(session);
    }
    finish_buckets(buckets)
}

/// UTC calendar date of a unix timestamp, `YYYY-MM-DD`.
pub fn daily_bucket_key(ended_at: i64) -> Option<String> {
    let dt = DateTime::from_timestamp(ended_at, 0)?;
    Some(dt.format("%Y-%m-%d").to_string())
}

/// ISO-8601 week of a unix timestamp, `YYYY-Www`.
///
/// The ISO year can differ from the calendar year at year boundaries
/// (2024-12-30 is 2025-W01).
pub fn weekly_bucket_key(ended_at: i64) -> Option<String> {
    let dt = DateTime::from_timestamp(ended_at, 0)?;
    let week = dt.iso_week();
    Some(format!("{}-W{:02}", week.year(), week.week()))
}

/// Group by UTC calendar day of `ended_at`.
///
/// Sessions without an end time are excluded.
pub fn group_by_day(sessions: &[Session]) -> Vec<BucketStatistics> {
    group_by_time(sessions, daily_bucket_key)
}

/// Group by ISO week of `ended_at`.
///
/// Sessions without an end time are excluded.
pub fn group_by_week(sessions: &[Session]) -> Vec<BucketStatistics> {
    group_by_time(sessions, weekly_bucket_key)
}

fn group_by_time(
    sessions: &[Session],
    key_fn: fn(i64) -> Option<String>,
) -> Vec<BucketStatistics> {
    let mut buckets: BTreeMap<String, BucketAccumulator> = BTreeMap::new();
    for session in sessions {
        let Some(ended_at) = session.ended_at else {
            continue;
        };
        let Some(key) = key_fn(ended_at) else {
            continue;
        };
        buckets.entry(key).or_default().add(session);
    }
    finish_buckets(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn session(id: &str, status: SessionStatus, score: i64) -> Session {
        Session {
            id: id.to_string(),
            player_name: "morgan".to_string(),
            difficulty: 2,
            card_count: 10,
            categories: vec!["science".to_string()],
            status,
            score,
            total_moves: 10,
            correct_moves: 7,
            incorrect_moves: 3,
            started_at: 1_700_000_000,
            ended_at: None,
            duration_seconds: None,
        }
    }

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp()
    }

    #[test]
    fn test_accuracy_zero_moves() {
        assert_eq!(accuracy_pct(0, 0), 0.0);
    }

    #[test]
    fn test_accuracy_rounds_to_two_decimals() {
        // 2/3 must come out as 66.67, not 66.666...
        assert_eq!(accuracy_pct(2, 3), 66.67);
        assert_eq!(accuracy_pct(1, 3), 33.33);
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(win_rate_pct(0, 0), 0.0);
        assert_eq!(win_rate_pct(1, 3), 33.33);
        assert_eq!(win_rate_pct(3, 3), 100.0);
    }

    #[test]
    fn test_player_statistics_counts_and_rates() {
        let mut won = session("a", SessionStatus::Completed, 120);
        won.duration_seconds = Some(300);
        let lost = session("b", SessionStatus::Completed, 0);
        let abandoned = session("c", SessionStatus::Abandoned, 0);
        let active = session("d", SessionStatus::Active, 0);

        let stats = player_statistics("morgan", &[won, lost, abandoned, active]);
        assert_eq!(stats.total_games_played, 4);
        assert_eq!(stats.total_games_won, 1);
        assert_eq!(stats.total_games_lost, 1);
        assert_eq!(stats.total_games_abandoned, 1);
        assert_eq!(stats.total_score, 120);
        assert_eq!(stats.total_moves, 40);
        assert_eq!(stats.total_correct_moves, 28);
        assert_eq!(stats.average_accuracy, 70.0);
        assert_eq!(stats.average_score_per_game, 30.0);
        assert_eq!(stats.win_rate, 25.0);
        assert_eq!(stats.total_play_time_seconds, 300);
        assert_eq!(stats.average_game_duration_seconds, 300.0);
    }

    #[test]
    fn test_worst_score_ignores_zero_scores() {
        let high = session("a", SessionStatus::Completed, 200);
        let low = session("b", SessionStatus::Completed, 50);
        let zero = session("c", SessionStatus::Completed, 0);

        let stats = player_statistics("morgan", &[high, low, zero]);
        assert_eq!(stats.best_score, 200);
        assert_eq!(stats.worst_score, 50);
    }

    #[test]
    fn test_no_sessions_gives_empty_variant() {
        let stats = player_statistics("nobody", &[]);
        assert_eq!(stats, PlayerStatistics::empty("nobody"));
    }

    #[test]
    fn test_category_buckets_credit_each_label_in_full() {
        let mut multi = session("a", SessionStatus::Completed, 100);
        multi.categories = vec!["science".to_string(), "politics".to_string()];
        let single = session("b", SessionStatus::Completed, 50);

        let buckets = group_by_category(&[multi, single]);
        assert_eq!(buckets.len(), 2);
        // BTreeMap keys: politics < science
        assert_eq!(buckets[0].bucket, "politics");
        assert_eq!(buckets[0].games_played, 1);
        assert_eq!(buckets[1].bucket, "science");
        assert_eq!(buckets[1].games_played, 2);
        // 2 + 1 credits from 2 sessions: inflation is expected
        let total: i64 = buckets.iter().map(|b| b.games_played).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_difficulty_buckets() {
        let mut easy = session("a", SessionStatus::Completed, 10);
        easy.difficulty = 1;
        let mut hard = session("b", SessionStatus::Completed, 90);
        hard.difficulty = 3;

        let buckets = group_by_difficulty(&[easy, hard]);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].bucket, "1");
        assert_eq!(buckets[1].bucket, "3");
        assert_eq!(buckets[1].best_score, 90);
    }

    #[test]
    fn test_daily_buckets_exclude_open_sessions() {
        let mut ended = session("a", SessionStatus::Completed, 10);
        ended.ended_at = Some(ts(2024, 3, 5));
        let open = session("b", SessionStatus::Active, 0);

        let buckets = group_by_day(&[ended, open]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].bucket, "2024-03-05");
        assert_eq!(buckets[0].games_played, 1);
    }

    #[test]
    fn test_iso_week_boundaries() {
        // 2024-01-01 is a Monday; 2024-01-07 the following Sunday.
        assert_eq!(weekly_bucket_key(ts(2024, 1, 1)).unwrap(), "2024-W01");
        assert_eq!(weekly_bucket_key(ts(2024, 1, 7)).unwrap(), "2024-W01");
        assert_eq!(weekly_bucket_key(ts(2024, 1, 8)).unwrap(), "2024-W02");
    }

    #[test]
    fn test_iso_year_differs_from_calendar_year() {
        // 2024-12-30 belongs to ISO week 2025-W01.
        assert_eq!(weekly_bucket_key(ts(2024, 12, 30)).unwrap(), "2025-W01");
    }

    #[test]
    fn test_weekly_buckets_group_across_days() {
        let mut monday = session("a", SessionStatus::Completed, 10);
        monday.ended_at = Some(ts(2024, 1, 1));
        let mut sunday = session("b", SessionStatus::Completed, 20);
        sunday.ended_at = Some(ts(2024, 1, 7));
        let mut next = session("c", SessionStatus::Completed, 30);
        next.ended_at = Some(ts(2024, 1, 8));

        let buckets = group_by_week(&[monday, sunday, next]);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].bucket, "2024-W01");
        assert_eq!(buckets[0].games_played, 2);
        assert_eq!(buckets[1].bucket, "2024-W02");
        assert_eq!(buckets[1].games_played, 1);
    }
}
