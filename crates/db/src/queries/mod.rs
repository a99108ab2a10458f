// crates/db/src/queries/mod.rs
// Ledger and aggregation operations for the chronodeck SQLite database.

pub(crate) mod row_types;

mod leaderboard;
mod moves;
mod sessions;
mod stats;

pub use leaderboard::LeaderboardFilter;
