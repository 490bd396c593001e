//! SQLite relational sink.
//!
//! The source of truth for synchronized data. Also serves the agent list
//! that seeds the reconciler and the per-category job ledger.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;
use tracing::debug;

use super::database::connection::{create_pool, run_migrations, DbPool};
use super::database::model::{
    AccountPositionRow, AccountTotalRow, AgentRow, AnalyticsRow, ConversationRow, InceptionRow,
    ModelAnalyticsRow, PriceRow, SnapshotHistoryRow, SnapshotRow, SyncRunRow, TradeRow,
};
use super::database::schema::{
    account_positions, account_totals, agents, analytics_snapshots, conversations,
    crypto_prices, model_analytics_details, since_inception_values, snapshot_history, snapshots,
    sync_runs, trades,
};
use crate::domain::{
    AccountTotal, Agent, CanonicalId, Category, JobRun, LeaderboardSnapshot, Record,
    TradeRecord,
};
use crate::error::{Error, Result};
use crate::port::{AgentDirectory, JobLedger, Sink, SinkRole};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite-backed relational sink.
pub struct SqliteSink {
    pool: DbPool,
}

impl SqliteSink {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and apply pending migrations.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be created or migrations fail.
    pub fn open(path: &str) -> Result<Self> {
        let pool = create_pool(path)?;
        run_migrations(&pool)?;
        Ok(Self::new(pool))
    }

    fn conn(&self) -> Result<Conn> {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }

    fn upsert_snapshot(conn: &mut SqliteConnection, s: &LeaderboardSnapshot) -> Result<()> {
        let latest = SnapshotRow::from(s);
        let history = SnapshotHistoryRow::from(s);
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::replace_into(snapshots::table)
                .values(&latest)
                .execute(conn)?;
            diesel::replace_into(snapshot_history::table)
                .values(&history)
                .execute(conn)?;
            Ok(())
        })?;
        Ok(())
    }

    fn upsert_account(conn: &mut SqliteConnection, account: &AccountTotal) -> Result<()> {
        let totals = AccountTotalRow::from(account);
        let positions: Vec<AccountPositionRow> = account
            .positions
            .iter()
            .map(|p| AccountPositionRow::new(account, p))
            .collect();
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::replace_into(account_totals::table)
                .values(&totals)
                .execute(conn)?;
            // The payload lists every open position; anything missing has closed.
            diesel::delete(
                account_positions::table.filter(account_positions::account_id.eq(&totals.id)),
            )
            .execute(conn)?;
            for position in &positions {
                diesel::replace_into(account_positions::table)
                    .values(position)
                    .execute(conn)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Insert a trade unless its id exists. A replay carrying exit data for
    /// a row that is still open fills in the exit fields only.
    fn insert_trade(conn: &mut SqliteConnection, trade: &TradeRecord) -> Result<bool> {
        let row = TradeRow::new(trade, &Utc::now());
        let inserted = diesel::insert_or_ignore_into(trades::table)
            .values(&row)
            .execute(conn)?;
        if inserted > 0 {
            return Ok(true);
        }

        if row.exit_time.is_some() {
            let closed = diesel::update(
                trades::table
                    .filter(trades::id.eq(&row.id))
                    .filter(trades::exit_time.is_null()),
            )
            .set((
                trades::exit_price.eq(row.exit_price),
                trades::exit_time.eq(row.exit_time.clone()),
                trades::realized_net_pnl.eq(row.realized_net_pnl),
                trades::realized_gross_pnl.eq(row.realized_gross_pnl),
                trades::fees.eq(row.fees),
            ))
            .execute(conn)?;
            if closed > 0 {
                debug!(trade_id = %row.id, "Filled exit fields of open trade");
            }
        }
        Ok(false)
    }

    /// Latest snapshot row of an agent.
    ///
    /// # Errors
    /// Returns an error on connection or query failure.
    pub fn latest_snapshot(&self, agent: &CanonicalId) -> Result<Option<LeaderboardSnapshot>> {
        let mut conn = self.conn()?;
        let row: Option<SnapshotRow> = snapshots::table
            .find(format!("snapshot-{agent}"))
            .select(SnapshotRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(SnapshotRow::into_domain).transpose()
    }

    /// Number of history rows recorded for an agent.
    ///
    /// # Errors
    /// Returns an error on connection or query failure.
    pub fn history_len(&self, agent: &CanonicalId) -> Result<i64> {
        let mut conn = self.conn()?;
        Ok(snapshot_history::table
            .filter(snapshot_history::agent_id.eq(agent.as_str()))
            .count()
            .get_result(&mut conn)?)
    }

    /// Stored trade row by id.
    ///
    /// # Errors
    /// Returns an error on connection or query failure.
    pub fn find_trade(&self, id: &str) -> Result<Option<TradeRow>> {
        let mut conn = self.conn()?;
        Ok(trades::table
            .find(id)
            .select(TradeRow::as_select())
            .first(&mut conn)
            .optional()?)
    }

    /// Total stored trades.
    ///
    /// # Errors
    /// Returns an error on connection or query failure.
    pub fn trade_count(&self) -> Result<i64> {
        let mut conn = self.conn()?;
        Ok(trades::table.count().get_result(&mut conn)?)
    }

    /// Stored analytics rows of an agent, oldest first.
    ///
    /// # Errors
    /// Returns an error on connection or query failure.
    pub fn analytics_for(&self, agent: &CanonicalId) -> Result<Vec<AnalyticsRow>> {
        let mut conn = self.conn()?;
        Ok(analytics_snapshots::table
            .filter(analytics_snapshots::agent_id.eq(agent.as_str()))
            .order(analytics_snapshots::snapshot_time.asc())
            .select(AnalyticsRow::as_select())
            .load(&mut conn)?)
    }

    /// Stored full analytics payload of an agent.
    ///
    /// # Errors
    /// Returns an error on connection or query failure.
    pub fn model_analytics_for(&self, agent: &CanonicalId) -> Result<Option<ModelAnalyticsRow>> {
        let mut conn = self.conn()?;
        Ok(model_analytics_details::table
            .find(agent.as_str())
            .select(ModelAnalyticsRow::as_select())
            .first(&mut conn)
            .optional()?)
    }

    /// Stored positions of an account.
    ///
    /// # Errors
    /// Returns an error on connection or query failure.
    pub fn positions_for(&self, account_id: &str) -> Result<Vec<AccountPositionRow>> {
        let mut conn = self.conn()?;
        Ok(account_positions::table
            .filter(account_positions::account_id.eq(account_id))
            .order(account_positions::symbol.asc())
            .select(AccountPositionRow::as_select())
            .load(&mut conn)?)
    }
}

#[async_trait]
impl Sink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn role(&self) -> SinkRole {
        SinkRole::Primary
    }

    async fn upsert(&self, record: &Record) -> Result<()> {
        let mut conn = self.conn()?;
        match record {
            Record::Snapshot(s) => Self::upsert_snapshot(&mut conn, s)?,
            Record::Trade(t) => {
                diesel::replace_into(trades::table)
                    .values(&TradeRow::new(t, &Utc::now()))
                    .execute(&mut conn)?;
            }
            Record::Analytics(a) => {
                diesel::replace_into(analytics_snapshots::table)
                    .values(&AnalyticsRow::new(a)?)
                    .execute(&mut conn)?;
            }
            Record::ModelAnalytics(d) => {
                diesel::replace_into(model_analytics_details::table)
                    .values(&ModelAnalyticsRow::new(d)?)
                    .execute(&mut conn)?;
            }
            Record::Conversation(c) => {
                diesel::replace_into(conversations::table)
                    .values(&ConversationRow::new(c)?)
                    .execute(&mut conn)?;
            }
            Record::Account(a) => Self::upsert_account(&mut conn, a)?,
            Record::Inception(v) => {
                diesel::replace_into(since_inception_values::table)
                    .values(&InceptionRow::from(v))
                    .execute(&mut conn)?;
            }
            Record::Price(p) => {
                diesel::replace_into(crypto_prices::table)
                    .values(&PriceRow::from(p))
                    .execute(&mut conn)?;
            }
        }
        Ok(())
    }

    async fn insert_or_ignore(&self, record: &Record) -> Result<bool> {
        let mut conn = self.conn()?;
        let inserted = match record {
            Record::Trade(t) => return Self::insert_trade(&mut conn, t),
            Record::Conversation(c) => diesel::insert_or_ignore_into(conversations::table)
                .values(&ConversationRow::new(c)?)
                .execute(&mut conn)?,
            Record::Snapshot(s) => diesel::insert_or_ignore_into(snapshots::table)
                .values(&SnapshotRow::from(s))
                .execute(&mut conn)?,
            Record::Analytics(a) => diesel::insert_or_ignore_into(analytics_snapshots::table)
                .values(&AnalyticsRow::new(a)?)
                .execute(&mut conn)?,
            Record::ModelAnalytics(d) => diesel::insert_or_ignore_into(model_analytics_details::table)
                .values(&ModelAnalyticsRow::new(d)?)
                .execute(&mut conn)?,
            Record::Account(a) => diesel::insert_or_ignore_into(account_totals::table)
                .values(&AccountTotalRow::from(a))
                .execute(&mut conn)?,
            Record::Inception(v) => diesel::insert_or_ignore_into(since_inception_values::table)
                .values(&InceptionRow::from(v))
                .execute(&mut conn)?,
            Record::Price(p) => diesel::insert_or_ignore_into(crypto_prices::table)
                .values(&PriceRow::from(p))
                .execute(&mut conn)?,
        };
        Ok(inserted > 0)
    }
}

impl AgentDirectory for SqliteSink {
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        let mut conn = self.conn()?;
        let rows: Vec<AgentRow> = agents::table
            .order(agents::id.asc())
            .select(AgentRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Agent::from).collect())
    }
}

#[async_trait]
impl JobLedger for SqliteSink {
    async fn last_run(&self, category: Category) -> Result<Option<JobRun>> {
        let mut conn = self.conn()?;
        let row: Option<SyncRunRow> = sync_runs::table
            .find(category.as_str())
            .select(SyncRunRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(JobRun::try_from).transpose()
    }

    async fn record_run(&self, run: &JobRun) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::replace_into(sync_runs::table)
            .values(&SyncRunRow::from(run))
            .execute(&mut conn)?;
        Ok(())
    }

    async fn list_runs(&self) -> Result<Vec<JobRun>> {
        let mut conn = self.conn()?;
        let rows: Vec<SyncRunRow> = sync_runs::table
            .order(sync_runs::category.asc())
            .select(SyncRunRow::as_select())
            .load(&mut conn)?;
        rows.into_iter().map(JobRun::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryStatus, ModelAnalyticsDetail, Side, TradeId, TradePnl, WriteOutcome};
    use chrono::{DateTime, TimeZone};

    fn open_temp() -> (tempfile::TempDir, SqliteSink) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.db");
        let sink = SqliteSink::open(path.to_str().unwrap()).unwrap();
        (dir, sink)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn open_trade(id: &str) -> TradeRecord {
        TradeRecord {
            id: TradeId::new(id),
            agent_id: CanonicalId::from("grok-1"),
            symbol: "BTC".into(),
            side: Side::Long,
            entry_price: 100_000.0,
            exit_price: None,
            entry_time: at(1_760_000_000),
            exit_time: None,
            quantity: 0.5,
            leverage: 10.0,
            pnl: TradePnl::default(),
            fees: 1.25,
        }
    }

    fn snapshot(agent: &str, cycle: i64, equity: f64) -> LeaderboardSnapshot {
        LeaderboardSnapshot {
            agent_id: CanonicalId::from(agent),
            return_pct: 12.3,
            equity,
            win_rate: 55.0,
            rank: 1,
            rank_change: 0,
            num_trades: 20,
            sharpe: 0.4,
            timestamp: at(cycle),
        }
    }

    #[tokio::test]
    async fn trade_insert_is_idempotent() {
        let (_dir, sink) = open_temp();
        let record = Record::Trade(open_trade("t-1"));

        assert_eq!(sink.write(&record).await.unwrap(), WriteOutcome::Inserted);
        assert_eq!(sink.write(&record).await.unwrap(), WriteOutcome::Ignored);
        assert_eq!(sink.write(&record).await.unwrap(), WriteOutcome::Ignored);
        assert_eq!(sink.trade_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn open_trade_keeps_null_pnl() {
        let (_dir, sink) = open_temp();
        sink.write(&Record::Trade(open_trade("t-open"))).await.unwrap();

        let row = sink.find_trade("t-open").unwrap().unwrap();
        assert_eq!(row.exit_time, None);
        assert_eq!(row.realized_net_pnl, None);
    }

    #[tokio::test]
    async fn replay_with_exit_fills_open_trade_only_once() {
        let (_dir, sink) = open_temp();
        sink.write(&Record::Trade(open_trade("t-2"))).await.unwrap();

        let mut closed = open_trade("t-2");
        closed.exit_price = Some(101_000.0);
        closed.exit_time = Some(at(1_760_003_600));
        closed.pnl = TradePnl {
            realized_net: Some(498.75),
            realized_gross: Some(500.0),
        };
        assert_eq!(
            sink.write(&Record::Trade(closed.clone())).await.unwrap(),
            WriteOutcome::Ignored
        );

        let mut rewrite = closed;
        rewrite.exit_price = Some(1.0);
        rewrite.pnl.realized_net = Some(-99.0);
        sink.write(&Record::Trade(rewrite)).await.unwrap();

        let row = sink.find_trade("t-2").unwrap().unwrap();
        assert_eq!(row.exit_price, Some(101_000.0));
        assert_eq!(row.realized_net_pnl, Some(498.75));
        assert_eq!(row.exit_time.as_deref(), Some("2025-10-09T09:53:20Z"));
    }

    #[tokio::test]
    async fn snapshot_upsert_replaces_latest_and_appends_history_per_cycle() {
        let (_dir, sink) = open_temp();
        let agent = CanonicalId::from("claude-1");

        sink.write(&Record::Snapshot(snapshot("claude-1", 1_000, 11_230.0)))
            .await
            .unwrap();
        sink.write(&Record::Snapshot(snapshot("claude-1", 1_000, 11_230.0)))
            .await
            .unwrap();
        assert_eq!(sink.history_len(&agent).unwrap(), 1);

        sink.write(&Record::Snapshot(snapshot("claude-1", 1_300, 11_500.0)))
            .await
            .unwrap();
        assert_eq!(sink.history_len(&agent).unwrap(), 2);

        let latest = sink.latest_snapshot(&agent).unwrap().unwrap();
        assert_eq!(latest.equity, 11_500.0);
        assert_eq!(latest.timestamp, at(1_300));
    }

    #[tokio::test]
    async fn model_analytics_keeps_latest_payload_per_agent() {
        let (_dir, sink) = open_temp();
        let agent = CanonicalId::from("qwen-1");
        let detail = |sharpe: f64, secs: i64| {
            Record::ModelAnalytics(ModelAnalyticsDetail {
                agent_id: agent.clone(),
                model_id: "qwen3-max".into(),
                raw: serde_json::json!({"sharpe_ratio": sharpe}),
                updated_at: at(secs),
            })
        };

        sink.write(&detail(0.1, 1_000)).await.unwrap();
        sink.write(&detail(0.7, 4_600)).await.unwrap();

        let row = sink.model_analytics_for(&agent).unwrap().unwrap();
        assert_eq!(row.model_id, "qwen3-max");
        assert_eq!(row.raw_data, r#"{"sharpe_ratio":0.7}"#);
        assert_eq!(row.updated_at, "1970-01-01T01:16:40Z");
    }

    #[tokio::test]
    async fn seeded_agents_are_listed() {
        let (_dir, sink) = open_temp();
        let agents = sink.list_agents().await.unwrap();
        let ids: Vec<&str> = agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["chatgpt-1", "claude-1", "deepseek-1", "gemini-1", "grok-1", "qwen-1"]
        );
    }

    #[tokio::test]
    async fn job_ledger_keeps_last_run_per_category() {
        let (_dir, sink) = open_temp();
        assert!(sink.last_run(Category::Trades).await.unwrap().is_none());

        for (secs, synced) in [(100, 3), (400, 5)] {
            sink.record_run(&JobRun {
                category: Category::Trades,
                last_run: at(secs),
                status: CategoryStatus::Succeeded,
                synced,
            })
            .await
            .unwrap();
        }

        let run = sink.last_run(Category::Trades).await.unwrap().unwrap();
        assert_eq!(run.last_run, at(400));
        assert_eq!(run.synced, 5);
        assert_eq!(sink.list_runs().await.unwrap().len(), 1);
    }
}
