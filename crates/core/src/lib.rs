// crates/core/src/lib.rs
pub mod cache;
pub mod clock;
pub mod leaderboard;
pub mod monitor;
pub mod progression;
pub mod stats;
pub mod types;

pub use cache::*;
pub use clock::*;
pub use leaderboard::*;
pub use monitor::*;
pub use progression::*;
pub use stats::*;
pub use types::*;
