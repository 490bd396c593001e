//! Analytics aggregates, flattened from the upstream breakdown tables, and
//! the per-model detail payloads stored as received.

use serde::Deserialize;
use serde_json::Value;

use super::lenient::{count, opt_f64, opt_string, timestamp};
use super::{decode, malformed, TransformContext};
use crate::domain::{AnalyticsAggregate, Category, ModelAnalyticsDetail, Record};
use crate::error::SyncError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeePnl {
    #[serde(deserialize_with = "opt_f64")]
    overall_pnl_with_fees: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    overall_pnl_without_fees: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    total_fees_paid: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    avg_taker_fee: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    avg_net_pnl: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    biggest_net_gain: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    biggest_net_loss: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    std_net_pnl: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WinnersLosers {
    #[serde(deserialize_with = "opt_f64")]
    win_rate: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    avg_winners_net_pnl: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    avg_losers_net_pnl: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Signals {
    #[serde(deserialize_with = "opt_f64")]
    num_long_signals: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    num_short_signals: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    num_close_signals: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    num_hold_signals: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LongsShorts {
    #[serde(deserialize_with = "opt_f64")]
    num_long_trades: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    num_short_trades: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Overview {
    #[serde(deserialize_with = "opt_f64")]
    avg_holding_period_mins: Option<f64>,
    #[serde(deserialize_with = "opt_f64")]
    avg_size_of_trade_notional: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAnalytics {
    #[serde(default, deserialize_with = "opt_string")]
    model_id: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    updated_at: Option<f64>,

    #[serde(default)]
    fee_pnl_moves_breakdown_table: Option<FeePnl>,
    #[serde(default)]
    winners_losers_breakdown_table: Option<WinnersLosers>,
    #[serde(default)]
    signals_breakdown_table: Option<Signals>,
    #[serde(default)]
    longs_shorts_breakdown_table: Option<LongsShorts>,
    #[serde(default)]
    overall_trades_overview_table: Option<Overview>,
}

pub(super) fn transform(item: &Value, ctx: &TransformContext<'_>) -> Result<Record, SyncError> {
    const CATEGORY: Category = Category::Analytics;

    let raw: RawAnalytics = decode(CATEGORY, item)?;
    let agent_id = ctx.agent(CATEGORY, raw.model_id.as_deref())?;

    let snapshot_time = raw
        .updated_at
        .and_then(timestamp)
        .or(ctx.server_time)
        .unwrap_or(ctx.cycle);

    let fees = raw.fee_pnl_moves_breakdown_table.unwrap_or_default();
    let wl = raw.winners_losers_breakdown_table.unwrap_or_default();
    let signals = raw.signals_breakdown_table.unwrap_or_default();
    let ls = raw.longs_shorts_breakdown_table.unwrap_or_default();
    let overview = raw.overall_trades_overview_table.unwrap_or_default();

    let longs = signals.num_long_signals.unwrap_or(0.0);
    let shorts = signals.num_short_signals.unwrap_or(0.0);
    let closes = signals.num_close_signals.unwrap_or(0.0);
    let win_rate = wl.win_rate.unwrap_or(0.0);
    let directional = longs + shorts;

    Ok(Record::Analytics(AnalyticsAggregate {
        agent_id,
        snapshot_time,

        total_trades: count(longs + shorts + closes),
        winning_trades: count(win_rate / 100.0 * directional),
        losing_trades: count((1.0 - win_rate / 100.0) * directional),
        win_rate,

        total_pnl: fees.overall_pnl_with_fees.unwrap_or(0.0),
        pnl_without_fees: fees.overall_pnl_without_fees.unwrap_or(0.0),
        total_fees: fees.total_fees_paid.unwrap_or(0.0),
        avg_fee_per_trade: fees.avg_taker_fee.unwrap_or(0.0),
        avg_net_pnl: fees.avg_net_pnl.unwrap_or(0.0),
        biggest_net_gain: fees.biggest_net_gain.unwrap_or(0.0),
        biggest_net_loss: fees.biggest_net_loss.unwrap_or(0.0),
        avg_winners_net_pnl: wl.avg_winners_net_pnl.unwrap_or(0.0),
        avg_losers_net_pnl: wl.avg_losers_net_pnl.unwrap_or(0.0),

        buy_signals: count(longs),
        sell_signals: count(shorts),
        close_signals: count(closes),
        hold_signals: count(signals.num_hold_signals.unwrap_or(0.0)),

        num_long_trades: count(ls.num_long_trades.unwrap_or(0.0)),
        num_short_trades: count(ls.num_short_trades.unwrap_or(0.0)),
        avg_holding_period_mins: overview.avg_holding_period_mins.unwrap_or(0.0),
        avg_trade_notional: overview.avg_size_of_trade_notional.unwrap_or(0.0),

        volatility: fees.std_net_pnl,
        raw: item.clone(),
    }))
}

/// One fetched per-model payload, tagged with the model it was fetched for.
#[derive(Debug, Deserialize)]
struct RawDetail {
    model_id: String,
    #[serde(default)]
    payload: Value,
}

pub(super) fn transform_detail(
    item: &Value,
    ctx: &TransformContext<'_>,
) -> Result<Record, SyncError> {
    const CATEGORY: Category = Category::ModelAnalytics;

    let raw: RawDetail = decode(CATEGORY, item)?;
    if raw.payload.is_null() {
        return Err(malformed(CATEGORY, format!("empty payload for {}", raw.model_id)));
    }
    let agent_id = ctx.agent(CATEGORY, Some(raw.model_id.as_str()))?;

    Ok(Record::ModelAnalytics(ModelAnalyticsDetail {
        agent_id,
        model_id: raw.model_id,
        raw: raw.payload,
        updated_at: ctx.cycle,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sync::reconcile::Reconciler;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn aggregate(item: Value, ctx: &TransformContext<'_>) -> AnalyticsAggregate {
        match transform(&item, ctx).unwrap() {
            Record::Analytics(a) => a,
            other => panic!("expected analytics, got {other:?}"),
        }
    }

    #[test]
    fn flattens_breakdown_tables() {
        let reconciler = Reconciler::with_static_aliases();
        let ctx = TransformContext::new(&reconciler, Utc::now());
        let a = aggregate(
            json!({
                "model_id": "gemini-2.5-pro",
                "updated_at": 1760000000,
                "fee_pnl_moves_breakdown_table": {
                    "overall_pnl_with_fees": -1200.5,
                    "overall_pnl_without_fees": -900,
                    "total_fees_paid": 300.5,
                    "std_net_pnl": 42.0
                },
                "winners_losers_breakdown_table": {"win_rate": 25.0},
                "signals_breakdown_table": {
                    "num_long_signals": 10, "num_short_signals": 6,
                    "num_close_signals": 4, "num_hold_signals": 80
                }
            }),
            &ctx,
        );

        assert_eq!(a.agent_id.as_str(), "gemini-1");
        assert_eq!(a.snapshot_time.timestamp(), 1_760_000_000);
        assert_eq!(a.total_trades, 20);
        assert_eq!(a.winning_trades, 4);
        assert_eq!(a.losing_trades, 12);
        assert_eq!(a.total_pnl, -1200.5);
        assert_eq!(a.volatility, Some(42.0));
        assert_eq!(a.hold_signals, 80);
    }

    #[test]
    fn missing_signals_table_defaults_counts_to_zero() {
        let reconciler = Reconciler::with_static_aliases();
        let ctx = TransformContext::new(&reconciler, Utc::now());
        let a = aggregate(
            json!({
                "model_id": "grok-4",
                "fee_pnl_moves_breakdown_table": {"overall_pnl_with_fees": 10}
            }),
            &ctx,
        );

        assert_eq!(a.buy_signals, 0);
        assert_eq!(a.sell_signals, 0);
        assert_eq!(a.total_trades, 0);
        assert_eq!(a.volatility, None);
    }

    #[test]
    fn snapshot_time_falls_back_to_server_time_then_cycle() {
        let reconciler = Reconciler::with_static_aliases();
        let cycle = Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap();
        let server = Utc.with_ymd_and_hms(2025, 10, 20, 11, 59, 0).unwrap();

        let mut ctx = TransformContext::new(&reconciler, cycle);
        let a = aggregate(json!({"model_id": "qwen3-max"}), &ctx);
        assert_eq!(a.snapshot_time, cycle);

        ctx.server_time = Some(server);
        let a = aggregate(json!({"model_id": "qwen3-max"}), &ctx);
        assert_eq!(a.snapshot_time, server);
    }

    #[test]
    fn detail_keeps_payload_under_canonical_id() {
        let reconciler = Reconciler::with_static_aliases();
        let cycle = Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap();
        let ctx = TransformContext::new(&reconciler, cycle);
        let payload = json!({"analytics": [{"model_id": "deepseek-chat-v3.1", "sharpe_ratio": 0.8}]});

        let record = transform_detail(
            &json!({"model_id": "deepseek-chat-v3.1", "payload": payload.clone()}),
            &ctx,
        )
        .unwrap();

        let Record::ModelAnalytics(detail) = record else {
            panic!("expected model analytics");
        };
        assert_eq!(detail.agent_id.as_str(), "deepseek-1");
        assert_eq!(detail.model_id, "deepseek-chat-v3.1");
        assert_eq!(detail.raw, payload);
        assert_eq!(detail.updated_at, cycle);
    }

    #[test]
    fn detail_for_unknown_model_is_unmapped() {
        let reconciler = Reconciler::with_static_aliases();
        let ctx = TransformContext::new(&reconciler, Utc::now());
        let err = transform_detail(&json!({"model_id": "llama-9", "payload": {}}), &ctx).unwrap_err();
        assert!(matches!(err, SyncError::UnmappedIdentifier { .. }));

        let err = transform_detail(&json!({"model_id": "grok-4"}), &ctx).unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { .. }));
    }

    #[test]
    fn wrong_typed_table_is_malformed() {
        let reconciler = Reconciler::with_static_aliases();
        let ctx = TransformContext::new(&reconciler, Utc::now());
        let err = transform(
            &json!({"model_id": "grok-4", "signals_breakdown_table": "n/a"}),
            &ctx,
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::MalformedRecord { .. }));
    }
}
