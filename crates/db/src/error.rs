// crates/db/src/error.rs
use thiserror::Error;

/// Storage-layer error taxonomy.
///
/// `Validation` is the caller's fault (4xx-equivalent), `NotFound`
/// means a referenced session/move is absent, `Conflict` an illegal
/// state transition, and `Sqlx` any storage/constraint failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("failed to determine data directory")]
    NoDataDir,

    #[error("failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "session",
            id: id.into(),
        }
    }

    pub fn move_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "move",
            id: id.into(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
