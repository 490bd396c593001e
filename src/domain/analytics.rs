//! Flattened per-agent analytics rollups.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::CanonicalId;

/// Point-in-time analytics summary for one agent.
///
/// Built by flattening the upstream breakdown tables. Derived counts are
/// rounded once, when the aggregate is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsAggregate {
    pub agent_id: CanonicalId,
    pub snapshot_time: DateTime<Utc>,

    pub total_trades: i64,
    pub winning_trades: i64,
    pub losing_trades: i64,
    pub win_rate: f64,

    pub total_pnl: f64,
    pub pnl_without_fees: f64,
    pub total_fees: f64,
    pub avg_fee_per_trade: f64,
    pub avg_net_pnl: f64,
    pub biggest_net_gain: f64,
    pub biggest_net_loss: f64,
    pub avg_winners_net_pnl: f64,
    pub avg_losers_net_pnl: f64,

    pub buy_signals: i64,
    pub sell_signals: i64,
    pub close_signals: i64,
    pub hold_signals: i64,

    pub num_long_trades: i64,
    pub num_short_trades: i64,
    pub avg_holding_period_mins: f64,
    pub avg_trade_notional: f64,

    /// Standard deviation of net P&L, when the upstream reports one.
    pub volatility: Option<f64>,

    /// The upstream record as received.
    pub raw: serde_json::Value,
}

impl AnalyticsAggregate {
    /// Natural key: one aggregate per (agent, snapshot time).
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.agent_id, self.snapshot_time.timestamp())
    }
}

/// An agent's full analytics payload from the per-model endpoint.
///
/// Kept verbatim; only the latest payload per agent is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAnalyticsDetail {
    pub agent_id: CanonicalId,
    /// Upstream model id the payload was fetched under.
    pub model_id: String,
    pub raw: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
