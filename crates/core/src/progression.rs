// crates/core/src/progression.rs
//! Progression analysis: a player's completed games in order, plus
//! recent-vs-early performance deltas.

use crate::stats::{accuracy_pct, round2};
use crate::types::{GameSnapshot, ImprovementSummary, ProgressionReport, Session};

/// How many games each comparison window covers at most.
const WINDOW: usize = 10;

/// Build a progression report from a player's completed sessions.
///
/// `sessions` must already be ordered by `started_at` ascending; game
/// numbers are assigned 1-based in that order. The improvement summary
/// compares the last [`WINDOW`] games against the first [`WINDOW`];
/// with 20 games or fewer the windows shrink and may overlap, down to
/// full overlap (trivially zero deltas) for very short histories.
pub fn progression_report(player_name: &str, sessions: &[Session]) -> ProgressionReport {
    let games: Vec<GameSnapshot> = sessions
        .iter()
        .enumerate()
        .map(|(i, session)| GameSnapshot {
            game_number: (i + 1) as i64,
            session_id: session.id.clone(),
            score: session.score,
            accuracy: accuracy_pct(session.correct_moves, session.total_moves),
            difficulty: session.difficulty,
            started_at: session.started_at,
            duration_seconds: session.duration_seconds,
        })
        .collect();

    let window = WINDOW.min(games.len());
    let first = &games[..window];
    let last = &games[games.len() - window..];

    let first_score = avg(first.iter().map(|g| g.score as f64));
    let last_score = avg(last.iter().map(|g| g.score as f64));
    let first_accuracy = avg(first.iter().map(|g| g.accuracy));
    let last_accuracy = avg(last.iter().map(|g| g.accuracy));

    let summary = ImprovementSummary {
        games_analyzed: games.len() as i64,
        window: window as i64,
        first_window_avg_score: round2(first_score),
        last_window_avg_score: round2(last_score),
        score_improvement: round2(last_score - first_score),
        first_window_avg_accuracy: round2(first_accuracy),
        last_window_avg_accuracy: round2(last_accuracy),
        accuracy_improvement: round2(last_accuracy - first_accuracy),
    };

    ProgressionReport {
        player_name: player_name.to_string(),
        games,
        summary,
    }
}

fn avg(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
