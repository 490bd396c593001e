//! Trade records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::{CanonicalId, TradeId};

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Parse upstream side text. `buy` and `long` are long, `sell` and `short` are short.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Some(Self::Long),
            "short" | "sell" => Some(Self::Short),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

/// Realized P&L of a trade.
///
/// `None` means the position is still open or the upstream did not report
/// it; it is never conflated with a realized zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TradePnl {
    pub realized_net: Option<f64>,
    pub realized_gross: Option<f64>,
}

/// One completed or open position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub id: TradeId,
    pub agent_id: CanonicalId,
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub quantity: f64,
    pub leverage: f64,
    pub pnl: TradePnl,
    pub fees: f64,
}

impl TradeRecord {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }
}
