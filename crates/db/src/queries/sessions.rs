// crates/db/src/queries/sessions.rs
// Session lifecycle: create, read, status transitions, delete.

use chrono::Utc;
use chronodeck_core::{NewSession, Session, SessionPatch, SessionStatus};
use tracing::{info, warn};

use super::row_types::{SessionRow, SESSION_COLUMNS};
use crate::{ids, Database, LedgerError, LedgerResult};

fn validate_new_session(new: &NewSession) -> LedgerResult<()> {
    if new.player_name.trim().is_empty() {
        return Err(LedgerError::validation("player_name must not be empty"));
    }
    if new.difficulty < 1 {
        return Err(LedgerError::validation("difficulty must be at least 1"));
    }
    if new.card_count < 1 {
        return Err(LedgerError::validation("card_count must be at least 1"));
    }
    if new.categories.is_empty() {
        return Err(LedgerError::validation("categories must not be empty"));
    }
    Ok(())
}

impl Database {
    /// Insert a new session in `active` status with zero counters.
    pub async fn create_session(&self, new: &NewSession) -> LedgerResult<Session> {
        validate_new_session(new)?;

        let id = ids::new_id();
        let started_at = Utc::now().timestamp();
        let categories = serde_json::to_string(&new.categories)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, player_name, difficulty, card_count, categories,
                                  status, started_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6)
            "#,
        )
        .bind(&id)
        .bind(&new.player_name)
        .bind(new.difficulty)
        .bind(new.card_count)
        .bind(&categories)
        .bind(started_at)
        .execute(self.pool())
        .await?;

        info!(session_id = %id, player = %new.player_name, "session created");

        Ok(Session {
            id,
            player_name: new.player_name.clone(),
            difficulty: new.difficulty,
            card_count: new.card_count,
            categories: new.categories.clone(),
            status: SessionStatus::Active,
            score: 0,
            total_moves: 0,
            correct_moves: 0,
            incorrect_moves: 0,
            started_at,
            ended_at: None,
            duration_seconds: None,
        })
    }

    /// Fetch a session by id.
    pub async fn get_session(&self, id: &str) -> LedgerResult<Session> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(SessionRow::into_session)
            .ok_or_else(|| LedgerError::session_not_found(id))
    }

    /// All of a player's sessions, newest first.
    pub async fn sessions_for_player(&self, player_name: &str) -> LedgerResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE player_name = ?1
             ORDER BY started_at DESC"
        ))
        .bind(player_name)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(SessionRow::into_session).collect())
    }

    /// A player's completed sessions ordered by start time ascending,
    /// the order the progression analyzer numbers games in.
    pub async fn completed_sessions_for_player(
        &self,
        player_name: &str,
    ) -> LedgerResult<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE player_name = ?1 AND status = 'completed'
             ORDER BY started_at ASC, id ASC"
        ))
        .bind(player_name)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(SessionRow::into_session).collect())
    }

    /// Transition a session out of `active` and merge patch fields in
    /// the same write.
    ///
    /// Terminal sessions are never rewritten: a second transition
    /// attempt returns `Conflict`.
    pub async fn update_session_status(
        &self,
        id: &str,
        status: SessionStatus,
        patch: &SessionPatch,
    ) -> LedgerResult<Session> {
        if status == SessionStatus::Active {
            return Err(LedgerError::validation(
                "cannot transition a session back to active",
            ));
        }
        if matches!(patch.score, Some(score) if score < 0) {
            return Err(LedgerError::validation("score must not be negative"));
        }

        let result = sqlx::query(
            r#"
            UPDATE sessions SET
                status = ?1,
                score = COALESCE(?2, score),
                ended_at = COALESCE(?3, ended_at),
                duration_seconds = COALESCE(?4, duration_seconds)
            WHERE id = ?5 AND status = 'active'
            "#,
        )
        .bind(status.as_db_str())
        .bind(patch.score)
        .bind(patch.ended_at)
        .bind(patch.duration_seconds)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing session from a terminal one.
            let existing = self.get_session(id).await?;
            warn!(
                session_id = %id,
                status = existing.status.as_db_str(),
                "rejected status transition on terminal session"
            );
            return Err(LedgerError::Conflict(format!(
                "session {id} is already {}",
                existing.status.as_db_str()
            )));
        }

        info!(session_id = %id, status = status.as_db_str(), "session status updated");
        self.get_session(id).await
    }

    /// Hard-delete a session; its moves go with it via FK cascade.
    pub async fn delete_session(&self, id: &str) -> LedgerResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::session_not_found(id));
        }
        info!(session_id = %id, "session deleted");
        Ok(())
    }
}
