// crates/core/src/types.rs
// Domain entities and derived aggregate shapes for the session ledger.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a play session.
///
/// Sessions are created `Active` and move exactly once to `Completed`
/// or `Abandoned`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    /// Parse a status column value. Unknown strings map to `Active`
    /// rather than failing the whole row read.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "completed" => SessionStatus::Completed,
            "abandoned" => SessionStatus::Abandoned,
            _ => SessionStatus::Active,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

/// One play-through instance for one player.
///
/// Counters maintain `total_moves = correct_moves + incorrect_moves`
/// at all times; the ledger only ever applies relative increments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub player_name: String,
    pub difficulty: i64,
    pub card_count: i64,
    /// Category labels, order-irrelevant, never empty.
    pub categories: Vec<String>,
    pub status: SessionStatus,
    pub score: i64,
    pub total_moves: i64,
    pub correct_moves: i64,
    pub incorrect_moves: i64,
    /// Unix seconds.
    pub started_at: i64,
    /// Unix seconds, set at completion/abandonment.
    pub ended_at: Option<i64>,
    /// Set only at completion.
    pub duration_seconds: Option<i64>,
}

/// Input for creating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub player_name: String,
    pub difficulty: i64,
    pub card_count: i64,
    pub categories: Vec<String>,
}

/// Fields merged into a session alongside a status transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPatch {
    pub score: Option<i64>,
    pub ended_at: Option<i64>,
    pub duration_seconds: Option<i64>,
}

/// One card placement event within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Move {
    pub id: String,
    pub session_id: String,
    pub card_id: String,
    /// None means the card was drawn and not yet on the timeline.
    pub position_before: Option<i64>,
    pub position_after: i64,
    pub is_correct: bool,
    /// 1-based, caller-supplied, unique within the session.
    pub move_number: i64,
    pub time_taken_seconds: Option<f64>,
    /// Unix seconds.
    pub created_at: i64,
}

/// Input for recording a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMove {
    pub session_id: String,
    pub card_id: String,
    pub position_before: Option<i64>,
    pub position_after: i64,
    pub is_correct: bool,
    pub move_number: i64,
    pub time_taken_seconds: Option<f64>,
}

// ============================================================================
// Derived aggregates -- computed on demand, never persisted.
// ============================================================================

/// Score distribution figures only the store-aggregation strategy
/// produces (percentiles are pushed into SQL, not recomputed per row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub median_score: i64,
    pub p90_score: i64,
    pub score_stddev: f64,
    pub score_variance: f64,
}

/// Full per-player summary. The all-zero variant (with `None`
/// timestamps) is returned for unknown players, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub player_name: String,
    pub total_games_played: i64,
    pub total_games_won: i64,
    pub total_games_lost: i64,
    pub total_games_abandoned: i64,
    pub total_score: i64,
    pub total_moves: i64,
    pub total_correct_moves: i64,
    pub total_incorrect_moves: i64,
    pub total_play_time_seconds: i64,
    pub average_score_per_game: f64,
    pub average_accuracy: f64,
    pub best_score: i64,
    pub worst_score: i64,
    pub average_game_duration_seconds: f64,
    pub win_rate: f64,
    pub last_played_at: Option<i64>,
    pub first_played_at: Option<i64>,
    /// Populated by the store-aggregation strategy only.
    pub distribution: Option<ScoreDistribution>,
}

impl PlayerStatistics {
    /// The no-sessions variant for `player_name`.
    pub fn empty(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            total_games_played: 0,
            total_games_won: 0,
            total_games_lost: 0,
            total_games_abandoned: 0,
            total_score: 0,
            total_moves: 0,
            total_correct_moves: 0,
            total_incorrect_moves: 0,
            total_play_time_seconds: 0,
            average_score_per_game: 0.0,
            average_accuracy: 0.0,
            best_score: 0,
            worst_score: 0,
            average_game_duration_seconds: 0.0,
            win_rate: 0.0,
            last_played_at: None,
            first_played_at: None,
            distribution: None,
        }
    }
}

/// Per-bucket summary (category, difficulty, calendar day, ISO week).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStatistics {
    /// Bucket key: a category label, a difficulty level rendered as a
    /// string, a `YYYY-MM-DD` date, or a `YYYY-Www` ISO week.
    pub bucket: String,
    pub games_played: i64,
    pub games_won: i64,
    pub total_score: i64,
    pub total_moves: i64,
    pub correct_moves: i64,
    pub average_score: f64,
    pub accuracy: f64,
    pub win_rate: f64,
    pub best_score: i64,
}

/// One completed game in a player's chronological history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// 1-based position in the player's completed-game history.
    pub game_number: i64,
    pub session_id: String,
    pub score: i64,
    pub accuracy: f64,
    pub difficulty: i64,
    pub started_at: i64,
    pub duration_seconds: Option<i64>,
}

/// Recent-vs-early performance deltas over a player's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSummary {
    pub games_analyzed: i64,
    /// Window length actually used (shrinks below 10 for short histories).
    pub window: i64,
    pub first_window_avg_score: f64,
    pub last_window_avg_score: f64,
    pub score_improvement: f64,
    pub first_window_avg_accuracy: f64,
    pub last_window_avg_accuracy: f64,
    pub accuracy_improvement: f64,
}

/// Ordered game history plus the improvement summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionReport {
    pub player_name: String,
    pub games: Vec<GameSnapshot>,
    pub summary: ImprovementSummary,
}

/// One player's ranked summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub games_played: i64,
    pub avg_score: f64,
    pub best_score: i64,
    pub total_correct_moves: i64,
    pub total_moves: i64,
    pub accuracy_percentage: f64,
    /// 1-based, assigned after sorting.
    pub rank: i64,
}

/// Store-side ledger totals for a dashboard-style summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerOverview {
    pub total_sessions: i64,
    pub active_sessions: i64,
    pub completed_sessions: i64,
    pub abandoned_sessions: i64,
    pub total_players: i64,
    pub total_moves: i64,
}

/// Move-level aggregate for a single session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMoveStats {
    pub total_moves: i64,
    pub correct_moves: i64,
    pub incorrect_moves: i64,
    pub accuracy: f64,
    pub average_move_time: Option<f64>,
    pub fastest_move: Option<f64>,
    pub slowest_move: Option<f64>,
    /// Moves that carried an elapsed-time reading.
    pub moves_with_timing: i64,
}
