//! Leaderboard entries.
//!
//! Two shapes are accepted: the camelCase summary (`aiModelId`, `totalPnL`,
//! `totalAssets`, `winRate`, `rank`, `rankChange`) and the native one
//! (`id`, `return_pct`, `equity`, `num_wins`, `num_trades`, `sharpe`).
//! Every missing number becomes 0.

use serde::Deserialize;
use serde_json::Value;

use super::lenient::{count, opt_f64, opt_string};
use super::{decode, TransformContext};
use crate::domain::{Category, LeaderboardSnapshot, Record};
use crate::error::SyncError;

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "aiModelId", default, deserialize_with = "opt_string")]
    ai_model_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    model_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    id: Option<String>,

    #[serde(rename = "totalPnL", default, deserialize_with = "opt_f64")]
    total_pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    return_pct: Option<f64>,

    #[serde(rename = "totalAssets", default, deserialize_with = "opt_f64")]
    total_assets: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    equity: Option<f64>,

    #[serde(rename = "winRate", default, deserialize_with = "opt_f64")]
    win_rate: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    num_wins: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    num_trades: Option<f64>,

    #[serde(default, deserialize_with = "opt_f64")]
    rank: Option<f64>,
    #[serde(rename = "rankChange", default, deserialize_with = "opt_f64")]
    rank_change: Option<f64>,

    #[serde(default, deserialize_with = "opt_f64")]
    sharpe: Option<f64>,
}

impl RawEntry {
    fn upstream_id(&self) -> Option<&str> {
        self.ai_model_id
            .as_deref()
            .or(self.model_id.as_deref())
            .or(self.id.as_deref())
    }

    fn win_rate(&self) -> f64 {
        if let Some(rate) = self.win_rate {
            return rate;
        }
        match (self.num_wins, self.num_trades) {
            (Some(wins), Some(trades)) if trades > 0.0 => wins / trades * 100.0,
            _ => 0.0,
        }
    }
}

pub(super) fn transform(
    item: &Value,
    index: usize,
    ctx: &TransformContext<'_>,
) -> Result<Record, SyncError> {
    let raw: RawEntry = decode(Category::Leaderboard, item)?;
    let agent_id = ctx.agent(Category::Leaderboard, raw.upstream_id())?;

    Ok(Record::Snapshot(LeaderboardSnapshot {
        agent_id,
        return_pct: raw.total_pnl.or(raw.return_pct).unwrap_or(0.0),
        equity: raw.total_assets.or(raw.equity).unwrap_or(0.0),
        win_rate: raw.win_rate(),
        rank: raw
            .rank
            .map_or(index as i64 + 1, count)
            .try_into()
            .unwrap_or(i32::MAX),
        rank_change: raw.rank_change.map_or(0, count).try_into().unwrap_or(0),
        num_trades: raw.num_trades.map_or(0, count),
        sharpe: raw.sharpe.unwrap_or(0.0),
        timestamp: ctx.cycle,
    }))
}
