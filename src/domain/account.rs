//! Account totals and the open positions behind them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::CanonicalId;

/// One open position inside an account snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountPosition {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub unrealized_pnl: f64,
    pub closed_pnl: f64,
    pub leverage: f64,
    pub margin: f64,
    pub liquidation_price: f64,
    pub entry_time: DateTime<Utc>,
    pub confidence: f64,
}

impl AccountPosition {
    #[must_use]
    pub fn key(&self, account_id: &str) -> String {
        format!("{account_id}_{}", self.symbol)
    }
}

/// Equity breakdown of one agent account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountTotal {
    pub id: String,
    pub agent_id: CanonicalId,
    pub timestamp: DateTime<Utc>,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_equity: f64,
    pub positions: Vec<AccountPosition>,
}
