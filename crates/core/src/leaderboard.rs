// crates/core/src/leaderboard.rs
//! Deterministic leaderboard ordering.

use std::cmp::Ordering;

use crate::types::LeaderboardEntry;

/// Sort, truncate, and rank leaderboard entries.
///
/// Order: average score descending, accuracy percentage descending,
/// player name ascending. The name key guarantees a reproducible order
/// for fully tied players. Truncation happens strictly after the sort
/// so a low `limit` never hides a better-ranked player.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        b.avg_score
            .partial_cmp(&a.avg_score)
            .unwrap_or(Ordering::Equal)
            .then(
                b.accuracy_percentage
                    .partial_cmp(&a.accuracy_percentage)
                    .unwrap_or(Ordering::Equal),
            )
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    entries.truncate(limit);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = (i + 1) as i64;
    }
    entries
}
