//! Account totals with their open positions.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::lenient::{opt_f64, opt_string, timestamp};
use super::{decode, malformed, TransformContext};
use crate::domain::{AccountPosition, AccountTotal, Category, Record};
use crate::error::SyncError;

const CATEGORY: Category = Category::AccountTotals;

#[derive(Debug, Deserialize)]
struct RawAccount {
    #[serde(default, deserialize_with = "opt_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    account_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    model_id: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    timestamp: Option<f64>,

    #[serde(default, deserialize_with = "opt_f64")]
    realized_pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    unrealized_pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    total_unrealized_pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    total_equity: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    dollar_equity: Option<f64>,

    #[serde(default)]
    positions: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    #[serde(default, deserialize_with = "opt_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    quantity: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    entry_price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    current_price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    unrealized_pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    closed_pnl: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    leverage: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    margin: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    liquidation_price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    entry_time: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    confidence: Option<f64>,
}

impl RawPosition {
    fn into_position(
        self,
        symbol: String,
        fallback_time: DateTime<Utc>,
    ) -> AccountPosition {
        AccountPosition {
            symbol,
            quantity: self.quantity.unwrap_or(0.0),
            entry_price: self.entry_price.unwrap_or(0.0),
            current_price: self.current_price.unwrap_or(0.0),
            unrealized_pnl: self.unrealized_pnl.unwrap_or(0.0),
            closed_pnl: self.closed_pnl.unwrap_or(0.0),
            leverage: self.leverage.unwrap_or(1.0),
            margin: self.margin.unwrap_or(0.0),
            liquidation_price: self.liquidation_price.unwrap_or(0.0),
            entry_time: self.entry_time.and_then(timestamp).unwrap_or(fallback_time),
            confidence: self.confidence.unwrap_or(0.0),
        }
    }
}

/// Positions arrive keyed by symbol or as a list carrying their own symbol.
fn positions(
    raw: Option<&Value>,
    fallback_time: DateTime<Utc>,
) -> Result<Vec<AccountPosition>, SyncError> {
    match raw {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| {
                let raw: RawPosition = decode(CATEGORY, value)?;
                let symbol = raw.symbol.clone().unwrap_or_else(|| key.clone());
                Ok(raw.into_position(symbol, fallback_time))
            })
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|value| {
                let raw: RawPosition = decode(CATEGORY, value)?;
                let symbol = raw
                    .symbol
                    .clone()
                    .ok_or_else(|| malformed(CATEGORY, "position without symbol"))?;
                Ok(raw.into_position(symbol, fallback_time))
            })
            .collect(),
        Some(other) => Err(malformed(
            CATEGORY,
            format!("positions must be an object or array, got {other}"),
        )),
    }
}

pub(super) fn transform(
    item: &Value,
    index: usize,
    ctx: &TransformContext<'_>,
) -> Result<Record, SyncError> {
    let raw: RawAccount = decode(CATEGORY, item)?;

    let account_prefix = raw
        .id
        .as_deref()
        .or(raw.account_id.as_deref())
        .map(|id| id.split_once('_').map_or(id, |(prefix, _)| prefix));
    let upstream_model = raw.model_id.as_deref().or(account_prefix);
    let agent_id = ctx.agent(CATEGORY, upstream_model)?;

    let timestamp = raw
        .timestamp
        .and_then(timestamp)
        .or(ctx.server_time)
        .unwrap_or(ctx.cycle);
    let positions = positions(raw.positions.as_ref(), timestamp)?;

    let id = raw
        .id
        .or(raw.account_id)
        .unwrap_or_else(|| format!("{agent_id}-{index}"));

    let realized_pnl = raw.realized_pnl.unwrap_or(0.0);
    let unrealized_pnl = raw
        .unrealized_pnl
        .or(raw.total_unrealized_pnl)
        .unwrap_or_else(|| positions.iter().map(|p| p.unrealized_pnl).sum());
    let total_equity = raw
        .total_equity
        .or(raw.dollar_equity)
        .unwrap_or(realized_pnl + unrealized_pnl);

    Ok(Record::Account(AccountTotal {
        id,
        agent_id,
        timestamp,
        realized_pnl,
        unrealized_pnl,
        total_equity,
        positions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sync::reconcile::Reconciler;
    use serde_json::json;

    fn account(item: Value) -> Result<AccountTotal, SyncError> {
        let reconciler = Reconciler::with_static_aliases();
        let ctx = TransformContext::new(&reconciler, Utc::now());
        transform(&item, 0, &ctx).map(|record| match record {
            Record::Account(a) => a,
            other => panic!("expected account, got {other:?}"),
        })
    }

    #[test]
    fn derives_agent_from_account_prefix_and_sums_positions() {
        let a = account(json!({
            "id": "gpt-5_42",
            "timestamp": 1760000000,
            "realized_pnl": 100.0,
            "positions": {
                "BTC": {"quantity": 0.5, "entry_price": 100000, "unrealized_pnl": 25.5},
                "ETH": {"quantity": -3, "entry_price": 4000, "unrealized_pnl": -5.5}
            }
        }))
        .unwrap();

        assert_eq!(a.agent_id.as_str(), "chatgpt-1");
        assert_eq!(a.id, "gpt-5_42");
        assert_eq!(a.positions.len(), 2);
        assert_eq!(a.positions[0].symbol, "BTC");
        assert_eq!(a.positions[0].key(&a.id), "gpt-5_42_BTC");
        assert_eq!(a.unrealized_pnl, 20.0);
        assert_eq!(a.total_equity, 120.0);
    }

    #[test]
    fn account_prefix_stops_at_first_underscore() {
        let a = account(json!({"id": "grok-4_acct_2", "realized_pnl": 5.0})).unwrap();
        assert_eq!(a.agent_id.as_str(), "grok-1");
        assert_eq!(a.id, "grok-4_acct_2");
    }

    #[test]
    fn explicit_totals_win_over_derivation() {
        let a = account(json!({
            "account_id": "acct-7", "model_id": "grok-4",
            "realized_pnl": 1, "total_unrealized_pnl": 2, "dollar_equity": 10250.75,
            "positions": [{"symbol": "SOL", "unrealized_pnl": 99}]
        }))
        .unwrap();

        assert_eq!(a.agent_id.as_str(), "grok-1");
        assert_eq!(a.unrealized_pnl, 2.0);
        assert_eq!(a.total_equity, 10250.75);
        assert_eq!(a.positions[0].leverage, 1.0);
    }

    #[test]
    fn listed_position_without_symbol_is_malformed() {
        let err = account(json!({
            "model_id": "grok-4",
            "positions": [{"quantity": 1}]
        }))
        .unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { .. }));
    }

    #[test]
    fn account_without_any_identity_is_malformed() {
        let err = account(json!({"realized_pnl": 5})).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { .. }));
    }
}
