//! Database model types for Diesel ORM.
//!
//! Times are stored as RFC 3339 text in UTC with second precision, so
//! lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{
    account_positions, account_totals, agents, analytics_snapshots, conversations,
    crypto_prices, model_analytics_details, since_inception_values, snapshot_history, snapshots,
    sync_runs, trades,
};
use crate::domain::{
    AccountPosition, AccountTotal, Agent, AnalyticsAggregate, CanonicalId, Category,
    CategoryStatus, ConversationRecord, InceptionValue, JobRun, LeaderboardSnapshot,
    ModelAnalyticsDetail, PriceQuote, TradeRecord,
};
use crate::error::{Error, Result};

#[must_use]
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// # Errors
/// Returns [`Error::Database`] when the stored text is not RFC 3339.
pub fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("invalid stored time '{raw}': {e}")))
}

/// Database row for an agent.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = agents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AgentRow {
    pub id: String,
    pub name: String,
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Agent::new(row.id, row.name)
    }
}

/// Database row for the latest leaderboard snapshot of an agent.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotRow {
    pub id: String,
    pub agent_id: String,
    pub return_pct: f64,
    pub equity: f64,
    pub win_rate: f64,
    pub rank: i32,
    pub rank_change: i32,
    pub num_trades: i64,
    pub sharpe: f64,
    pub timestamp: String,
}

impl From<&LeaderboardSnapshot> for SnapshotRow {
    fn from(s: &LeaderboardSnapshot) -> Self {
        Self {
            id: s.latest_key(),
            agent_id: s.agent_id.to_string(),
            return_pct: s.return_pct,
            equity: s.equity,
            win_rate: s.win_rate,
            rank: s.rank,
            rank_change: s.rank_change,
            num_trades: s.num_trades,
            sharpe: s.sharpe,
            timestamp: format_time(&s.timestamp),
        }
    }
}

/// Database row for one cycle's leaderboard snapshot.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = snapshot_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotHistoryRow {
    pub id: String,
    pub agent_id: String,
    pub return_pct: f64,
    pub equity: f64,
    pub win_rate: f64,
    pub rank: i32,
    pub rank_change: i32,
    pub num_trades: i64,
    pub sharpe: f64,
    pub timestamp: String,
}

impl From<&LeaderboardSnapshot> for SnapshotHistoryRow {
    fn from(s: &LeaderboardSnapshot) -> Self {
        let latest = SnapshotRow::from(s);
        Self {
            id: s.history_key(),
            agent_id: latest.agent_id,
            return_pct: latest.return_pct,
            equity: latest.equity,
            win_rate: latest.win_rate,
            rank: latest.rank,
            rank_change: latest.rank_change,
            num_trades: latest.num_trades,
            sharpe: latest.sharpe,
            timestamp: latest.timestamp,
        }
    }
}

/// Database row for a trade.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeRow {
    pub id: String,
    pub agent_id: String,
    pub symbol: String,
    pub side: String,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub quantity: f64,
    pub leverage: f64,
    pub realized_net_pnl: Option<f64>,
    pub realized_gross_pnl: Option<f64>,
    pub fees: f64,
    pub synced_at: String,
}

impl TradeRow {
    #[must_use]
    pub fn new(t: &TradeRecord, synced_at: &DateTime<Utc>) -> Self {
        Self {
            id: t.id.to_string(),
            agent_id: t.agent_id.to_string(),
            symbol: t.symbol.clone(),
            side: t.side.as_str().to_string(),
            entry_price: t.entry_price,
            exit_price: t.exit_price,
            entry_time: format_time(&t.entry_time),
            exit_time: t.exit_time.as_ref().map(format_time),
            quantity: t.quantity,
            leverage: t.leverage,
            realized_net_pnl: t.pnl.realized_net,
            realized_gross_pnl: t.pnl.realized_gross,
            fees: t.fees,
            synced_at: format_time(synced_at),
        }
    }
}

/// Database row for an analytics aggregate.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = analytics_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalyticsRow {
    pub id: String,
    pub agent_id: String,
    pub snapshot_time: String,
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
    pub volatility: Option<f64>,
    pub raw_data: String,
}

impl AnalyticsRow {
    /// # Errors
    /// Returns an error if the raw payload cannot be serialized.
    pub fn new(a: &AnalyticsAggregate) -> Result<Self> {
        Ok(Self {
            id: a.key(),
            agent_id: a.agent_id.to_string(),
            snapshot_time: format_time(&a.snapshot_time),
            total_trades: a.total_trades,
            winning_trades: a.winning_trades,
            losing_trades: a.losing_trades,
            win_rate: a.win_rate,
            total_pnl: a.total_pnl,
            pnl_without_fees: a.pnl_without_fees,
            total_fees: a.total_fees,
            avg_fee_per_trade: a.avg_fee_per_trade,
            avg_net_pnl: a.avg_net_pnl,
            biggest_net_gain: a.biggest_net_gain,
            biggest_net_loss: a.biggest_net_loss,
            avg_winners_net_pnl: a.avg_winners_net_pnl,
            avg_losers_net_pnl: a.avg_losers_net_pnl,
            buy_signals: a.buy_signals,
            sell_signals: a.sell_signals,
            close_signals: a.close_signals,
            hold_signals: a.hold_signals,
            num_long_trades: a.num_long_trades,
            num_short_trades: a.num_short_trades,
            avg_holding_period_mins: a.avg_holding_period_mins,
            avg_trade_notional: a.avg_trade_notional,
            volatility: a.volatility,
            raw_data: serde_json::to_string(&a.raw)?,
        })
    }
}

/// Database row for a model's full analytics payload.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = model_analytics_details)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ModelAnalyticsRow {
    pub agent_id: String,
    pub model_id: String,
    pub raw_data: String,
    pub updated_at: String,
}

impl ModelAnalyticsRow {
    /// # Errors
    /// Returns an error if the raw payload cannot be serialized.
    pub fn new(d: &ModelAnalyticsDetail) -> Result<Self> {
        Ok(Self {
            agent_id: d.agent_id.to_string(),
            model_id: d.model_id.clone(),
            raw_data: serde_json::to_string(&d.raw)?,
            updated_at: format_time(&d.updated_at),
        })
    }
}

/// Database row for a conversation.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ConversationRow {
    pub id: String,
    pub agent_id: String,
    pub timestamp: String,
    pub decision: String,
    pub symbol: Option<String>,
    pub confidence: Option<f64>,
    pub reasoning: String,
    pub chain_of_thought: String,
    pub raw_data: String,
}

impl ConversationRow {
    /// # Errors
    /// Returns an error if the raw payload cannot be serialized.
    pub fn new(c: &ConversationRecord) -> Result<Self> {
        Ok(Self {
            id: c.id.clone(),
            agent_id: c.agent_id.to_string(),
            timestamp: format_time(&c.timestamp),
            decision: c.decision.signal.clone(),
            symbol: c.decision.symbol.clone(),
            confidence: c.decision.confidence,
            reasoning: c.reasoning.clone(),
            chain_of_thought: c.chain_of_thought.clone(),
            raw_data: serde_json::to_string(&c.raw)?,
        })
    }
}

/// Database row for an account's totals.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = account_totals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountTotalRow {
    pub id: String,
    pub agent_id: String,
    pub timestamp: String,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_equity: f64,
}

impl From<&AccountTotal> for AccountTotalRow {
    fn from(a: &AccountTotal) -> Self {
        Self {
            id: a.id.clone(),
            agent_id: a.agent_id.to_string(),
            timestamp: format_time(&a.timestamp),
            realized_pnl: a.realized_pnl,
            unrealized_pnl: a.unrealized_pnl,
            total_equity: a.total_equity,
        }
    }
}

/// Database row for one open position of an account.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = account_positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountPositionRow {
    pub id: String,
    pub account_id: String,
    pub agent_id: String,
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub unrealized_pnl: f64,
    pub closed_pnl: f64,
    pub leverage: f64,
    pub margin: f64,
    pub liquidation_price: f64,
    pub entry_time: String,
    pub confidence: f64,
    pub updated_at: String,
}

impl AccountPositionRow {
    #[must_use]
    pub fn new(account: &AccountTotal, p: &AccountPosition) -> Self {
        Self {
            id: p.key(&account.id),
            account_id: account.id.clone(),
            agent_id: account.agent_id.to_string(),
            symbol: p.symbol.clone(),
            quantity: p.quantity,
            entry_price: p.entry_price,
            current_price: p.current_price,
            unrealized_pnl: p.unrealized_pnl,
            closed_pnl: p.closed_pnl,
            leverage: p.leverage,
            margin: p.margin,
            liquidation_price: p.liquidation_price,
            entry_time: format_time(&p.entry_time),
            confidence: p.confidence,
            updated_at: format_time(&account.timestamp),
        }
    }
}

/// Database row for a since-inception value.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = since_inception_values)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InceptionRow {
    pub id: String,
    pub agent_id: String,
    pub nav_since_inception: f64,
    pub inception_date: String,
    pub num_invocations: i64,
}

impl From<&InceptionValue> for InceptionRow {
    fn from(v: &InceptionValue) -> Self {
        Self {
            id: v.id.clone(),
            agent_id: v.agent_id.to_string(),
            nav_since_inception: v.nav_since_inception,
            inception_date: format_time(&v.inception_date),
            num_invocations: v.num_invocations,
        }
    }
}

/// Database row for an asset price.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crypto_prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceRow {
    pub symbol: String,
    pub price: f64,
    pub timestamp: String,
}

impl From<&PriceQuote> for PriceRow {
    fn from(p: &PriceQuote) -> Self {
        Self {
            symbol: p.symbol.clone(),
            price: p.price,
            timestamp: format_time(&p.timestamp),
        }
    }
}

/// Database row for a category job's last run.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = sync_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncRunRow {
    pub category: String,
    pub last_run: String,
    pub status: String,
    pub synced: i64,
}

impl From<&JobRun> for SyncRunRow {
    fn from(run: &JobRun) -> Self {
        Self {
            category: run.category.as_str().to_string(),
            last_run: format_time(&run.last_run),
            status: run.status.as_str().to_string(),
            synced: i64::try_from(run.synced).unwrap_or(i64::MAX),
        }
    }
}

impl TryFrom<SyncRunRow> for JobRun {
    type Error = Error;

    fn try_from(row: SyncRunRow) -> Result<Self> {
        let category: Category = row.category.parse().map_err(Error::Database)?;
        let status: CategoryStatus = row.status.parse().map_err(Error::Database)?;
        Ok(JobRun {
            category,
            last_run: parse_time(&row.last_run)?,
            status,
            synced: u64::try_from(row.synced).unwrap_or(0),
        })
    }
}

impl SnapshotRow {
    /// # Errors
    /// Returns an error if the stored timestamp is invalid.
    pub fn into_domain(self) -> Result<LeaderboardSnapshot> {
        Ok(LeaderboardSnapshot {
            agent_id: CanonicalId::new(self.agent_id),
            return_pct: self.return_pct,
            equity: self.equity,
            win_rate: self.win_rate,
            rank: self.rank,
            rank_change: self.rank_change,
            num_trades: self.num_trades,
            sharpe: self.sharpe,
            timestamp: parse_time(&self.timestamp)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn times_round_trip_at_second_precision() {
        let t = Utc.with_ymd_and_hms(2025, 10, 20, 12, 30, 5).unwrap();
        let stored = format_time(&t);
        assert_eq!(stored, "2025-10-20T12:30:05Z");
        assert_eq!(parse_time(&stored).unwrap(), t);
    }

    #[test]
    fn invalid_stored_time_is_a_database_error() {
        assert!(matches!(parse_time("yesterday"), Err(Error::Database(_))));
    }

    #[test]
    fn sync_run_row_rejects_unknown_category() {
        let row = SyncRunRow {
            category: "positions".into(),
            last_run: "2025-10-20T12:30:05Z".into(),
            status: "succeeded".into(),
            synced: 3,
        };
        assert!(JobRun::try_from(row).is_err());
    }
}
