//! Leaderboard snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::CanonicalId;

/// One agent's standing at a point in time.
///
/// Every numeric field is concrete: a missing upstream value is stored as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardSnapshot {
    pub agent_id: CanonicalId,
    pub return_pct: f64,
    pub equity: f64,
    pub win_rate: f64,
    pub rank: i32,
    pub rank_change: i32,
    pub num_trades: i64,
    pub sharpe: f64,
    pub timestamp: DateTime<Utc>,
}

impl LeaderboardSnapshot {
    /// Key of the "latest" row, replaced each cycle.
    #[must_use]
    pub fn latest_key(&self) -> String {
        format!("snapshot-{}", self.agent_id)
    }

    /// Key of the history row for this cycle.
    ///
    /// Stable within one cycle so a replay replaces rather than duplicates.
    #[must_use]
    pub fn history_key(&self) -> String {
        format!("{}-{}", self.agent_id, self.timestamp.timestamp())
    }
}
