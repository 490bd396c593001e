//! Trade records.
//!
//! An open position has no exit time and usually a null P&L; the null is
//! carried through as `None`, never as a realized zero.

use serde::Deserialize;
use serde_json::Value;

use super::lenient::{opt_f64, opt_string, timestamp};
use super::{decode, malformed, TransformContext};
use crate::domain::{Category, Record, Side, TradeId, TradePnl, TradeRecord};
use crate::error::SyncError;

#[derive(Debug, Deserialize)]
struct RawTrade {
    #[serde(default, deserialize_with = "opt_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    trade_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    model_id: Option<String>,

    #[serde(default, deserialize_with = "opt_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    side: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    trade_type: Option<String>,

    #[serde(default, deserialize_with = "opt_f64")]
    entry_price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    exit_price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    entry_time: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    exit_time: Option<f64>,

    #[serde(default, deserialize_with = "opt_f64")]
    quantity: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    entry_sz: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    leverage: Option<f64>,

    #[serde(default, deserialize_with = "opt_f64")]
    realized_net_pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    realized_gross_pnl: Option<f64>,

    #[serde(default, deserialize_with = "opt_f64")]
    entry_commission_dollars: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    exit_commission_dollars: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    total_commission_dollars: Option<f64>,
}

impl RawTrade {
    fn side(&self) -> Option<Side> {
        self.side
            .as_deref()
            .and_then(Side::parse)
            .or_else(|| self.trade_type.as_deref().and_then(Side::parse))
    }

    fn fees(&self) -> f64 {
        self.total_commission_dollars.unwrap_or_else(|| {
            self.entry_commission_dollars.unwrap_or(0.0)
                + self.exit_commission_dollars.unwrap_or(0.0)
        })
    }
}

pub(super) fn transform(item: &Value, ctx: &TransformContext<'_>) -> Result<Record, SyncError> {
    const CATEGORY: Category = Category::Trades;

    let raw: RawTrade = decode(CATEGORY, item)?;
    let agent_id = ctx.agent(CATEGORY, raw.model_id.as_deref())?;

    let symbol = raw
        .symbol
        .clone()
        .ok_or_else(|| malformed(CATEGORY, "missing symbol"))?;
    let side = raw
        .side()
        .ok_or_else(|| malformed(CATEGORY, "missing or unknown side"))?;
    let entry_time = raw
        .entry_time
        .and_then(timestamp)
        .ok_or_else(|| malformed(CATEGORY, "missing entry_time"))?;
    let exit_time = raw.exit_time.and_then(timestamp);

    let id = match raw.id.as_deref().or(raw.trade_id.as_deref()) {
        Some(id) => TradeId::new(id),
        None => TradeId::synthesize(entry_time.timestamp_millis()),
    };

    Ok(Record::Trade(TradeRecord {
        id,
        agent_id,
        symbol,
        side,
        entry_price: raw.entry_price.unwrap_or(0.0),
        exit_price: raw.exit_price,
        entry_time,
        exit_time,
        quantity: raw.quantity.or(raw.entry_sz).map_or(0.0, f64::abs),
        leverage: raw.leverage.unwrap_or(1.0),
        pnl: TradePnl {
            realized_net: raw.realized_net_pnl.or(raw.pnl),
            realized_gross: raw.realized_gross_pnl,
        },
        fees: raw.fees(),
    }))
}
