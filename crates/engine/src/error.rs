// crates/engine/src/error.rs
use thiserror::Error;

use chronodeck_db::LedgerError;

/// Read-side engine errors. Storage failures pass through unchanged in
/// kind; `Serde` covers cache (de)serialization of derived results.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
