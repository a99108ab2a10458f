// crates/db/src/queries/moves.rs
// Move recording: the transactional core of the ledger.
//
// Counters are only ever updated with relative increments inside the
// same transaction as the move insert, so concurrent recorders against
// one session serialize at the storage layer and never lose an update.

use std::collections::BTreeMap;

use chrono::Utc;
use chronodeck_core::{accuracy_pct, Move, NewMove, SessionMoveStats};
use tracing::info;

use super::row_types::{MoveRow, MOVE_COLUMNS};
use crate::{ids, Database, LedgerError, LedgerResult};

fn validate_new_move(new: &NewMove) -> LedgerResult<()> {
    if new.session_id.trim().is_empty() {
        return Err(LedgerError::validation("session_id must not be empty"));
    }
    if new.card_id.trim().is_empty() {
        return Err(LedgerError::validation("card_id must not be empty"));
    }
    if new.move_number < 1 {
        return Err(LedgerError::validation("move_number must be at least 1"));
    }
    if new.position_after < 0 {
        return Err(LedgerError::validation("position_after must not be negative"));
    }
    if matches!(new.time_taken_seconds, Some(t) if t < 0.0) {
        return Err(LedgerError::validation(
            "time_taken_seconds must not be negative",
        ));
    }
    Ok(())
}

/// Increment a session's counters inside `tx` by the given deltas.
///
/// `rows_affected == 0` is the NotFound signal: the parent session is
/// absent, and dropping the transaction rolls everything back.
async fn increment_counters_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    session_id: &str,
    total: i64,
    correct: i64,
    incorrect: i64,
) -> LedgerResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE sessions SET
            total_moves = total_moves + ?1,
            correct_moves = correct_moves + ?2,
            incorrect_moves = incorrect_moves + ?3
        WHERE id = ?4
        "#,
    )
    .bind(total)
    .bind(correct)
    .bind(incorrect)
    .bind(session_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::session_not_found(session_id));
    }
    Ok(())
}

async fn insert_move_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    new: &NewMove,
    id: &str,
    created_at: i64,
) -> LedgerResult<()> {
    sqlx::query(
        r#"
        INSERT INTO moves (id, session_id, card_id, position_before, position_after,
                           is_correct, move_number, time_taken_seconds, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(id)
    .bind(&new.session_id)
    .bind(&new.card_id)
    .bind(new.position_before)
    .bind(new.position_after)
    .bind(new.is_correct)
    .bind(new.move_number)
    .bind(new.time_taken_seconds)
    .bind(created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn built_move(new: &NewMove, id: String, created_at: i64) -> Move {
    Move {
        id,
        session_id: new.session_id.clone(),
        card_id: new.card_id.clone(),
        position_before: new.position_before,
        position_after: new.position_after,
        is_correct: new.is_correct,
        move_number: new.move_number,
        time_taken_seconds: new.time_taken_seconds,
        created_at,
    }
}

impl Database {
    /// Record one move: insert the move row and bump the parent
    /// session's counters as a single atomic unit.
    pub async fn record_move(&self, new: &NewMove) -> LedgerResult<Move> {
        validate_new_move(new)?;

        let id = ids::new_id();
        let created_at = Utc::now().timestamp();
        let (correct, incorrect) = if new.is_correct { (1, 0) } else { (0, 1) };

        let mut tx = self.pool().begin().await?;
        increment_counters_tx(&mut tx, &new.session_id, 1, correct, incorrect).await?;
        insert_move_tx(&mut tx, new, &id, created_at).await?;
        tx.commit().await?;

        Ok(built_move(new, id, created_at))
    }

    /// Record a batch of moves with the same all-or-nothing guarantee:
    /// every insert and one summed counter delta per parent session
    /// commit together, or the whole batch is discarded.
    ///
    /// An empty batch returns `[]` without opening a transaction.
    pub async fn create_moves_bulk(&self, new_moves: &[NewMove]) -> LedgerResult<Vec<Move>> {
        if new_moves.is_empty() {
            return Ok(Vec::new());
        }
        for new in new_moves {
            validate_new_move(new)?;
        }

        let created_at = Utc::now().timestamp();

        // One summed delta per session; BTreeMap for a deterministic
        // update order across concurrent batches.
        let mut deltas: BTreeMap<&str, (i64, i64, i64)> = BTreeMap::new();
        for new in new_moves {
            let entry = deltas.entry(new.session_id.as_str()).or_default();
            entry.0 += 1;
            if new.is_correct {
                entry.1 += 1;
            } else {
                entry.2 += 1;
            }
        }

        let mut tx = self.pool().begin().await?;
        for (session_id, (total, correct, incorrect)) in &deltas {
            increment_counters_tx(&mut tx, session_id, *total, *correct, *incorrect).await?;
        }

        let mut moves = Vec::with_capacity(new_moves.len());
        for new in new_moves {
            let id = ids::new_id();
            insert_move_tx(&mut tx, new, &id, created_at).await?;
            moves.push(built_move(new, id, created_at));
        }
        tx.commit().await?;

        info!(
            count = moves.len(),
            sessions = deltas.len(),
            "bulk moves recorded"
        );
        Ok(moves)
    }

    /// A session's moves ordered by move number ascending.
    pub async fn get_session_moves(&self, session_id: &str) -> LedgerResult<Vec<Move>> {
        // Surface a missing session as NotFound rather than [].
        self.get_session(session_id).await?;

        let rows: Vec<MoveRow> = sqlx::query_as(&format!(
            "SELECT {MOVE_COLUMNS} FROM moves WHERE session_id = ?1 ORDER BY move_number ASC"
        ))
        .bind(session_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(MoveRow::into_move).collect())
    }

    /// Administrative hard delete of a single move.
    ///
    /// Session counters are not rewound; the counter contract covers
    /// recording only.
    pub async fn delete_move(&self, id: &str) -> LedgerResult<()> {
        let result = sqlx::query("DELETE FROM moves WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::move_not_found(id));
        }
        info!(move_id = %id, "move deleted");
        Ok(())
    }

    /// Store-side move aggregate for one session: counts, accuracy,
    /// and timing extrema over moves that carried a timing reading.
    pub async fn session_move_stats(&self, session_id: &str) -> LedgerResult<SessionMoveStats> {
        self.get_session(session_id).await?;

        let (total, correct, avg_time, fastest, slowest, timed): (
            i64,
            i64,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN is_correct THEN 1 ELSE 0 END), 0),
                AVG(time_taken_seconds),
                MIN(time_taken_seconds),
                MAX(time_taken_seconds),
                COUNT(time_taken_seconds)
            FROM moves
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_one(self.pool())
        .await?;

        Ok(SessionMoveStats {
            total_moves: total,
            correct_moves: correct,
            incorrect_moves: total - correct,
            accuracy: accuracy_pct(correct, total),
            average_move_time: avg_time,
            fastest_move: fastest,
            slowest_move: slowest,
            moves_with_timing: timed,
        })
    }
}
