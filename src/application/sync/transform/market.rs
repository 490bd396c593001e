//! Asset prices and since-inception values.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::lenient::{count, opt_f64, opt_string, timestamp};
use super::{decode, malformed, TransformContext};
use crate::domain::{Category, InceptionValue, PriceQuote, Record};
use crate::error::SyncError;

/// Flatten a symbol-keyed price map into records carrying their symbol.
///
/// Bare numbers become `{symbol, price}`; objects get the key as their
/// symbol unless they already name one.
pub(super) fn price_map_items(map: &Map<String, Value>) -> Vec<Value> {
    map.iter()
        .map(|(symbol, value)| match value {
            Value::Object(fields) => {
                let mut fields = fields.clone();
                fields
                    .entry("symbol")
                    .or_insert_with(|| Value::String(symbol.clone()));
                Value::Object(fields)
            }
            other => serde_json::json!({ "symbol": symbol, "price": other }),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    #[serde(default, deserialize_with = "opt_string")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    timestamp: Option<f64>,
}

pub(super) fn transform_price(
    item: &Value,
    ctx: &TransformContext<'_>,
) -> Result<Record, SyncError> {
    const CATEGORY: Category = Category::Prices;

    let raw: RawPrice = decode(CATEGORY, item)?;
    let symbol = raw
        .symbol
        .ok_or_else(|| malformed(CATEGORY, "missing symbol"))?;
    let price = raw
        .price
        .ok_or_else(|| malformed(CATEGORY, format!("missing price for {symbol}")))?;

    Ok(Record::Price(PriceQuote {
        symbol,
        price,
        timestamp: raw
            .timestamp
            .and_then(timestamp)
            .or(ctx.server_time)
            .unwrap_or(ctx.cycle),
    }))
}

#[derive(Debug, Deserialize)]
struct RawInception {
    #[serde(default, deserialize_with = "opt_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    model_id: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    nav_since_inception: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    inception_date: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    num_invocations: Option<f64>,
}

pub(super) fn transform_inception(
    item: &Value,
    ctx: &TransformContext<'_>,
) -> Result<Record, SyncError> {
    const CATEGORY: Category = Category::SinceInception;

    let raw: RawInception = decode(CATEGORY, item)?;
    let agent_id = ctx.agent(CATEGORY, raw.model_id.as_deref())?;
    let nav_since_inception = raw
        .nav_since_inception
        .ok_or_else(|| malformed(CATEGORY, "missing nav_since_inception"))?;

    Ok(Record::Inception(InceptionValue {
        id: raw.id.unwrap_or_else(|| agent_id.to_string()),
        agent_id,
        nav_since_inception,
        inception_date: raw
            .inception_date
            .and_then(timestamp)
            .unwrap_or(ctx.cycle),
        num_invocations: count(raw.num_invocations.unwrap_or(0.0)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sync::reconcile::Reconciler;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn price_map_accepts_numbers_and_objects() {
        let map = json!({
            "BTC": {"price": 111000.5, "timestamp": 1760000000},
            "ETH": "4000.25"
        });
        let items = price_map_items(map.as_object().unwrap());

        assert_eq!(items[0]["symbol"], "BTC");
        assert_eq!(items[1], json!({"symbol": "ETH", "price": "4000.25"}));
    }

    #[test]
    fn price_defaults_timestamp_to_cycle() {
        let reconciler = Reconciler::with_static_aliases();
        let cycle = Utc.with_ymd_and_hms(2025, 10, 20, 8, 0, 0).unwrap();
        let ctx = TransformContext::new(&reconciler, cycle);

        let Record::Price(quote) =
            transform_price(&json!({"symbol": "DOGE", "price": "0.25"}), &ctx).unwrap()
        else {
            panic!("expected price");
        };
        assert_eq!(quote.price, 0.25);
        assert_eq!(quote.timestamp, cycle);
    }

    #[test]
    fn price_without_value_is_malformed() {
        let reconciler = Reconciler::with_static_aliases();
        let ctx = TransformContext::new(&reconciler, Utc::now());
        let err = transform_price(&json!({"symbol": "DOGE"}), &ctx).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { .. }));
    }

    #[test]
    fn inception_value_defaults_id_to_agent() {
        let reconciler = Reconciler::with_static_aliases();
        let ctx = TransformContext::new(&reconciler, Utc::now());
        let Record::Inception(value) = transform_inception(
            &json!({
                "model_id": "claude-sonnet-4-5",
                "nav_since_inception": 11230.4,
                "inception_date": 1760400000,
                "num_invocations": "412"
            }),
            &ctx,
        )
        .unwrap() else {
            panic!("expected inception value");
        };

        assert_eq!(value.id, "claude-1");
        assert_eq!(value.num_invocations, 412);
        assert_eq!(value.inception_date.timestamp(), 1_760_400_000);
    }
}
