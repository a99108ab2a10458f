// crates/engine/src/progression.rs
// Progression entry point: fetch the chronological completed history,
// hand the math to chronodeck_core.

use chronodeck_core::{progression, ProgressionReport};

use crate::{EngineResult, StatsEngine};

impl StatsEngine {
    /// A player's completed games in order plus recent-vs-early
    /// improvement deltas.
    pub async fn progression(&self, player_name: &str) -> EngineResult<ProgressionReport> {
        let params = [("player", player_name.to_string())];
        self.run_cached("progression", &params, || async {
            let sessions = self.db().completed_sessions_for_player(player_name).await?;
            Ok(progression::progression_report(player_name, &sessions))
        })
        .await
    }
}
