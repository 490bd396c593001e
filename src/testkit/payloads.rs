//! Canonical upstream payloads, one per category.
//!
//! Shapes follow what the upstream API sends, including its naming
//! inconsistencies across endpoints.

use serde_json::{json, Value};

/// Full analytics document for one model, as `analytics/<model>` sends it.
pub fn model_analytics(model: &str) -> Value {
    json!({
        "serverTime": 1760000000000_u64,
        "analytics": [{
            "model_id": model,
            "updated_at": 1760000000,
            "sharpe_ratio": 0.42,
            "signals_breakdown_table": {"num_long_signals": 12, "num_short_signals": 8},
            "invocation_breakdown_table": {"num_invocations": 412}
        }]
    })
}

/// Single-entry leaderboard for `claude-sonnet-4-5`.
pub fn leaderboard() -> Value {
    json!({"leaderboard": [{
        "aiModelId": "claude-sonnet-4-5",
        "totalPnL": 12.3,
        "totalAssets": 11230,
        "winRate": 55,
        "rank": 1,
        "rankChange": 0
    }]})
}

/// One closed trade and one open trade with a null P&L.
pub fn trades() -> Value {
    json!({"trades": [
        {
            "id": "deepseek-chat-v3.1_1760000000_btc",
            "model_id": "deepseek-chat-v3.1",
            "symbol": "BTC",
            "side": "long",
            "entry_price": 110000.0,
            "exit_price": 112000.0,
            "entry_time": 1760000000,
            "exit_time": 1760003600,
            "quantity": 0.5,
            "leverage": 10,
            "realized_net_pnl": 985.5,
            "realized_gross_pnl": 1000.0,
            "total_commission_dollars": 14.5
        },
        {
            "id": "gpt-5_1760007200_eth",
            "model_id": "gpt-5",
            "symbol": "ETH",
            "side": "short",
            "entry_price": 4100.0,
            "entry_time": 1760007200,
            "quantity": -3,
            "leverage": 5,
            "pnl": null
        }
    ]})
}

/// Analytics for one agent, with every breakdown table present.
pub fn analytics() -> Value {
    json!({"analytics": [{
        "model_id": "qwen3-max",
        "updated_at": 1760010000,
        "fee_pnl_moves_breakdown_table": {
            "overall_pnl_with_fees": 2310.4,
            "overall_pnl_without_fees": 2500.0,
            "total_fees_paid": 189.6,
            "avg_taker_fee": 4.2,
            "avg_net_pnl": 51.3,
            "biggest_net_gain": 1200.0,
            "biggest_net_loss": -340.0,
            "std_net_pnl": 210.7
        },
        "winners_losers_breakdown_table": {
            "win_rate": 40.0,
            "avg_winners_net_pnl": 310.0,
            "avg_losers_net_pnl": -120.0
        },
        "signals_breakdown_table": {
            "num_long_signals": 12,
            "num_short_signals": 8,
            "num_close_signals": 5,
            "num_hold_signals": 140
        },
        "longs_shorts_breakdown_table": {"num_long_trades": 12, "num_short_trades": 8},
        "overall_trades_overview_table": {
            "avg_holding_period_mins": 95.5,
            "avg_size_of_trade_notional": 15000.0
        }
    }]})
}

/// One conversation with an active signal.
pub fn conversations() -> Value {
    json!({"conversations": [{
        "id": "conv-grok-1760000000",
        "model_id": "grok-4",
        "timestamp": 1760000000,
        "llm_response": {
            "BTC": {"signal": "hold", "coin": "BTC", "confidence": 0.7},
            "SOL": {"signal": "buy_to_enter", "coin": "SOL", "confidence": 0.62}
        },
        "cot_trace_summary": "Entering SOL on breakout.",
        "cot_trace": "SOL broke resistance at 200."
    }]})
}

/// One account with two open positions keyed by symbol.
pub fn account_totals() -> Value {
    json!({"accountTotals": [{
        "id": "gemini-2.5-pro_7",
        "timestamp": 1760000000,
        "realized_pnl": -250.0,
        "positions": {
            "BTC": {"quantity": 0.1, "entry_price": 111000, "current_price": 111500, "unrealized_pnl": 50.0},
            "DOGE": {"quantity": -1000, "entry_price": 0.25, "current_price": 0.26, "unrealized_pnl": -10.0}
        }
    }]})
}

pub fn since_inception() -> Value {
    json!({"sinceInceptionValues": [{
        "id": "claude-inception",
        "model_id": "claude-sonnet-4-5",
        "nav_since_inception": 11230.0,
        "inception_date": 1759700000,
        "num_invocations": 412
    }]})
}

/// Prices keyed by symbol.
pub fn prices() -> Value {
    json!({"prices": {
        "BTC": {"price": 111500.0, "timestamp": 1760000000},
        "ETH": {"price": 4050.5, "timestamp": 1760000000}
    }})
}
