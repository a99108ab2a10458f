// crates/db/src/queries/row_types.rs
// Internal row types bridging SQLite rows to domain entities.

use chronodeck_core::{Move, Session, SessionStatus};
use sqlx::Row;

#[derive(Debug)]
pub(crate) struct SessionRow {
    id: String,
    player_name: String,
    difficulty: i64,
    card_count: i64,
    categories: String,
    status: String,
    score: i64,
    total_moves: i64,
    correct_moves: i64,
    incorrect_moves: i64,
    started_at: i64,
    ended_at: Option<i64>,
    duration_seconds: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for SessionRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            player_name: row.try_get("player_name")?,
            difficulty: row.try_get("difficulty")?,
            card_count: row.try_get("card_count")?,
            categories: row.try_get("categories")?,
            status: row.try_get("status")?,
            score: row.try_get("score")?,
            total_moves: row.try_get("total_moves")?,
            correct_moves: row.try_get("correct_moves")?,
            incorrect_moves: row.try_get("incorrect_moves")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
            duration_seconds: row.try_get("duration_seconds")?,
        })
    }
}

impl SessionRow {
    pub(crate) fn into_session(self) -> Session {
        // categories is a JSON array column; a corrupt value degrades
        // to an empty set rather than failing the whole read.
        let categories: Vec<String> = serde_json::from_str(&self.categories).unwrap_or_default();
        Session {
            id: self.id,
            player_name: self.player_name,
            difficulty: self.difficulty,
            card_count: self.card_count,
            categories,
            status: SessionStatus::from_db_str(&self.status),
            score: self.score,
            total_moves: self.total_moves,
            correct_moves: self.correct_moves,
            incorrect_moves: self.incorrect_moves,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_seconds: self.duration_seconds,
        }
    }
}

pub(crate) const SESSION_COLUMNS: &str = "id, player_name, difficulty, card_count, categories, \
     status, score, total_moves, correct_moves, incorrect_moves, \
     started_at, ended_at, duration_seconds";

#[derive(Debug)]
pub(crate) struct MoveRow {
    id: String,
    session_id: String,
    card_id: String,
    position_before: Option<i64>,
    position_after: i64,
    is_correct: bool,
    move_number: i64,
    time_taken_seconds: Option<f64>,
    created_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for MoveRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            card_id: row.try_get("card_id")?,
            position_before: row.try_get("position_before")?,
            position_after: row.try_get("position_after")?,
            is_correct: row.try_get("is_correct")?,
            move_number: row.try_get("move_number")?,
            time_taken_seconds: row.try_get("time_taken_seconds")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl MoveRow {
    pub(crate) fn into_move(self) -> Move {
        Move {
            id: self.id,
            session_id: self.session_id,
            card_id: self.card_id,
            position_before: self.position_before,
            position_after: self.position_after,
            is_correct: self.is_correct,
            move_number: self.move_number,
            time_taken_seconds: self.time_taken_seconds,
            created_at: self.created_at,
        }
    }
}

pub(crate) const MOVE_COLUMNS: &str = "id, session_id, card_id, position_before, position_after, \
     is_correct, move_number, time_taken_seconds, created_at";
