/// Inline SQL migrations for the chronodeck database schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: sessions table. The CHECK clause backs the ledger's
    // counter invariant at the storage layer.
    r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    player_name TEXT NOT NULL,
    difficulty INTEGER NOT NULL,
    card_count INTEGER NOT NULL,
    categories TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL DEFAULT 'active',
    score INTEGER NOT NULL DEFAULT 0 CHECK (score >= 0),
    total_moves INTEGER NOT NULL DEFAULT 0,
    correct_moves INTEGER NOT NULL DEFAULT 0,
    incorrect_moves INTEGER NOT NULL DEFAULT 0,
    started_at INTEGER NOT NULL,
    ended_at INTEGER,
    duration_seconds INTEGER,
    CHECK (total_moves = correct_moves + incorrect_moves)
);
"#,
    // Migration 2: sessions indexes
    r#"
CREATE INDEX IF NOT EXISTS idx_sessions_player ON sessions(player_name);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_sessions_ended ON sessions(ended_at);
"#,
    // Migration 3: moves table. move_number is caller-supplied and
    // unique within its session.
    r#"
CREATE TABLE IF NOT EXISTS moves (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    card_id TEXT NOT NULL,
    position_before INTEGER,
    position_after INTEGER NOT NULL,
    is_correct BOOLEAN NOT NULL,
    move_number INTEGER NOT NULL CHECK (move_number >= 1),
    time_taken_seconds REAL,
    created_at INTEGER NOT NULL,
    UNIQUE (session_id, move_number)
);
"#,
    // Migration 4: moves indexes
    r#"
CREATE INDEX IF NOT EXISTS idx_moves_session ON moves(session_id, move_number);
"#,
];
