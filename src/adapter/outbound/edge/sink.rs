//! Edge cache sink.
//!
//! Mirrors the relational sink's write semantics onto the edge database
//! with `INSERT OR REPLACE` / `INSERT OR IGNORE`. Tables carry the columns
//! the read paths need; full detail stays in the relational store.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{EdgeClient, Statement};
use crate::domain::{Record, TradeRecord};
use crate::error::Result;
use crate::port::{Sink, SinkRole};

/// Idempotent schema for the edge database.
pub const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS snapshots (id TEXT PRIMARY KEY, agent_id TEXT NOT NULL, return_pct REAL NOT NULL, equity REAL NOT NULL, win_rate REAL NOT NULL, rank INTEGER NOT NULL, rank_change INTEGER NOT NULL, num_trades INTEGER NOT NULL, sharpe REAL NOT NULL, timestamp TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS snapshot_history (id TEXT PRIMARY KEY, agent_id TEXT NOT NULL, return_pct REAL NOT NULL, equity REAL NOT NULL, win_rate REAL NOT NULL, rank INTEGER NOT NULL, rank_change INTEGER NOT NULL, num_trades INTEGER NOT NULL, sharpe REAL NOT NULL, timestamp TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS trades (id TEXT PRIMARY KEY, agent_id TEXT NOT NULL, symbol TEXT NOT NULL, side TEXT NOT NULL, entry_price REAL NOT NULL, exit_price REAL, entry_time TEXT NOT NULL, exit_time TEXT, quantity REAL NOT NULL, leverage REAL NOT NULL, realized_net_pnl REAL, realized_gross_pnl REAL, fees REAL NOT NULL)",
    "CREATE TABLE IF NOT EXISTS analytics (id TEXT PRIMARY KEY, agent_id TEXT NOT NULL, snapshot_time TEXT NOT NULL, total_trades INTEGER NOT NULL, winning_trades INTEGER NOT NULL, losing_trades INTEGER NOT NULL, win_rate REAL NOT NULL, total_pnl REAL NOT NULL, total_fees REAL NOT NULL, buy_signals INTEGER NOT NULL, sell_signals INTEGER NOT NULL, hold_signals INTEGER NOT NULL, volatility REAL)",
    "CREATE TABLE IF NOT EXISTS model_analytics_details (agent_id TEXT PRIMARY KEY, model_id TEXT NOT NULL, raw_data TEXT NOT NULL, updated_at TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS conversations (id TEXT PRIMARY KEY, agent_id TEXT NOT NULL, timestamp TEXT NOT NULL, decision TEXT NOT NULL, symbol TEXT, confidence REAL, reasoning TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS account_totals (id TEXT PRIMARY KEY, agent_id TEXT NOT NULL, timestamp TEXT NOT NULL, realized_pnl REAL NOT NULL, unrealized_pnl REAL NOT NULL, total_equity REAL NOT NULL, positions TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS since_inception_values (id TEXT PRIMARY KEY, agent_id TEXT NOT NULL, nav_since_inception REAL NOT NULL, inception_date TEXT NOT NULL, num_invocations INTEGER NOT NULL)",
    "CREATE TABLE IF NOT EXISTS crypto_prices (symbol TEXT PRIMARY KEY, price REAL NOT NULL, timestamp TEXT NOT NULL)",
];

/// Conflict behavior of an insert statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
    Replace,
    Ignore,
}

impl Conflict {
    const fn verb(self) -> &'static str {
        match self {
            Self::Replace => "INSERT OR REPLACE",
            Self::Ignore => "INSERT OR IGNORE",
        }
    }
}

fn time(t: &DateTime<Utc>) -> Value {
    Value::from(t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// `<verb> INTO table (a, b) VALUES (?1, ?2)` with positional parameters.
fn insert(conflict: Conflict, table: &str, columns: &[&str], params: Vec<Value>) -> Statement {
    debug_assert_eq!(columns.len(), params.len());
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    Statement::new(
        format!(
            "{} INTO {table} ({}) VALUES ({placeholders})",
            conflict.verb(),
            columns.join(", ")
        ),
        params,
    )
}

const SNAPSHOT_COLUMNS: &[&str] = &[
    "id",
    "agent_id",
    "return_pct",
    "equity",
    "win_rate",
    "rank",
    "rank_change",
    "num_trades",
    "sharpe",
    "timestamp",
];

fn trade_close(trade: &TradeRecord) -> Option<Statement> {
    let exit_time = trade.exit_time.as_ref()?;
    Some(Statement::new(
        "UPDATE trades SET exit_price = ?1, exit_time = ?2, realized_net_pnl = ?3, realized_gross_pnl = ?4, fees = ?5 WHERE id = ?6 AND exit_time IS NULL",
        vec![
            json!(trade.exit_price),
            time(exit_time),
            json!(trade.pnl.realized_net),
            json!(trade.pnl.realized_gross),
            json!(trade.fees),
            json!(trade.id.as_str()),
        ],
    ))
}

/// Statements writing one record. The first statement is the record's own
/// row; its change count decides whether the record was new.
fn statements(record: &Record, conflict: Conflict) -> Vec<Statement> {
    match record {
        Record::Snapshot(s) => {
            let values = |id: String| {
                vec![
                    json!(id),
                    json!(s.agent_id.as_str()),
                    json!(s.return_pct),
                    json!(s.equity),
                    json!(s.win_rate),
                    json!(s.rank),
                    json!(s.rank_change),
                    json!(s.num_trades),
                    json!(s.sharpe),
                    time(&s.timestamp),
                ]
            };
            vec![
                insert(conflict, "snapshots", SNAPSHOT_COLUMNS, values(s.latest_key())),
                insert(
                    conflict,
                    "snapshot_history",
                    SNAPSHOT_COLUMNS,
                    values(s.history_key()),
                ),
            ]
        }
        Record::Trade(t) => vec![insert(
            conflict,
            "trades",
            &[
                "id",
                "agent_id",
                "symbol",
                "side",
                "entry_price",
                "exit_price",
                "entry_time",
                "exit_time",
                "quantity",
                "leverage",
                "realized_net_pnl",
                "realized_gross_pnl",
                "fees",
            ],
            vec![
                json!(t.id.as_str()),
                json!(t.agent_id.as_str()),
                json!(t.symbol),
                json!(t.side.as_str()),
                json!(t.entry_price),
                json!(t.exit_price),
                time(&t.entry_time),
                t.exit_time.as_ref().map_or(Value::Null, time),
                json!(t.quantity),
                json!(t.leverage),
                json!(t.pnl.realized_net),
                json!(t.pnl.realized_gross),
                json!(t.fees),
            ],
        )],
        Record::Analytics(a) => vec![insert(
            conflict,
            "analytics",
            &[
                "id",
                "agent_id",
                "snapshot_time",
                "total_trades",
                "winning_trades",
                "losing_trades",
                "win_rate",
                "total_pnl",
                "total_fees",
                "buy_signals",
                "sell_signals",
                "hold_signals",
                "volatility",
            ],
            vec![
                json!(a.key()),
                json!(a.agent_id.as_str()),
                time(&a.snapshot_time),
                json!(a.total_trades),
                json!(a.winning_trades),
                json!(a.losing_trades),
                json!(a.win_rate),
                json!(a.total_pnl),
                json!(a.total_fees),
                json!(a.buy_signals),
                json!(a.sell_signals),
                json!(a.hold_signals),
                json!(a.volatility),
            ],
        )],
        Record::ModelAnalytics(d) => vec![insert(
            conflict,
            "model_analytics_details",
            &["agent_id", "model_id", "raw_data", "updated_at"],
            vec![
                json!(d.agent_id.as_str()),
                json!(d.model_id),
                Value::from(d.raw.to_string()),
                time(&d.updated_at),
            ],
        )],
        Record::Conversation(c) => vec![insert(
            conflict,
            "conversations",
            &[
                "id",
                "agent_id",
                "timestamp",
                "decision",
                "symbol",
                "confidence",
                "reasoning",
            ],
            vec![
                json!(c.id),
                json!(c.agent_id.as_str()),
                time(&c.timestamp),
                json!(c.decision.signal),
                json!(c.decision.symbol),
                json!(c.decision.confidence),
                json!(c.reasoning),
            ],
        )],
        Record::Account(a) => vec![insert(
            conflict,
            "account_totals",
            &[
                "id",
                "agent_id",
                "timestamp",
                "realized_pnl",
                "unrealized_pnl",
                "total_equity",
                "positions",
            ],
            vec![
                json!(a.id),
                json!(a.agent_id.as_str()),
                time(&a.timestamp),
                json!(a.realized_pnl),
                json!(a.unrealized_pnl),
                json!(a.total_equity),
                Value::from(json!(a.positions).to_string()),
            ],
        )],
        Record::Inception(v) => vec![insert(
            conflict,
            "since_inception_values",
            &[
                "id",
                "agent_id",
                "nav_since_inception",
                "inception_date",
                "num_invocations",
            ],
            vec![
                json!(v.id),
                json!(v.agent_id.as_str()),
                json!(v.nav_since_inception),
                time(&v.inception_date),
                json!(v.num_invocations),
            ],
        )],
        Record::Price(p) => vec![insert(
            conflict,
            "crypto_prices",
            &["symbol", "price", "timestamp"],
            vec![json!(p.symbol), json!(p.price), time(&p.timestamp)],
        )],
    }
}

/// Edge-cache mirror of the relational sink.
#[derive(Debug)]
pub struct EdgeSink {
    client: EdgeClient,
}

impl EdgeSink {
    #[must_use]
    pub fn new(client: EdgeClient) -> Self {
        Self { client }
    }

    /// Create the edge tables if they do not exist.
    ///
    /// # Errors
    /// Returns the first statement failure.
    pub async fn ensure_schema(&self) -> Result<()> {
        for sql in SCHEMA {
            self.client.execute(&Statement::new(*sql, Vec::new())).await?;
        }
        info!(tables = SCHEMA.len(), "Edge schema ready");
        Ok(())
    }

    async fn run(&self, statements: &[Statement]) -> Result<u64> {
        let mut first = None;
        for statement in statements {
            let changes = self.client.execute(statement).await?;
            first.get_or_insert(changes);
        }
        Ok(first.unwrap_or(0))
    }
}

#[async_trait]
impl Sink for EdgeSink {
    fn name(&self) -> &'static str {
        "edge"
    }

    fn role(&self) -> SinkRole {
        SinkRole::Mirror
    }

    async fn upsert(&self, record: &Record) -> Result<()> {
        self.run(&statements(record, Conflict::Replace)).await?;
        Ok(())
    }

    async fn insert_or_ignore(&self, record: &Record) -> Result<bool> {
        let inserted = self.run(&statements(record, Conflict::Ignore)).await? > 0;
        if !inserted {
            if let Record::Trade(trade) = record {
                if let Some(close) = trade_close(trade) {
                    let changes = self.client.execute(&close).await?;
                    debug!(trade_id = %trade.id, changes, "Edge trade close applied");
                }
            }
        }
        Ok(inserted)
    }
}
