//! Normalized records handed from the transformer to the sinks.

use serde::Serialize;

use super::account::AccountTotal;
use super::analytics::{AnalyticsAggregate, ModelAnalyticsDetail};
use super::conversation::ConversationRecord;
use super::id::Category;
use super::market::{InceptionValue, PriceQuote};
use super::snapshot::LeaderboardSnapshot;
use super::trade::TradeRecord;

/// How a record is written to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Replace on natural-key conflict.
    Upsert,
    /// No-op when the key already exists.
    InsertOrIgnore,
}

/// A normalized record of any category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Record {
    Snapshot(LeaderboardSnapshot),
    Trade(TradeRecord),
    Analytics(AnalyticsAggregate),
    ModelAnalytics(ModelAnalyticsDetail),
    Conversation(ConversationRecord),
    Account(AccountTotal),
    Inception(InceptionValue),
    Price(PriceQuote),
}

impl Record {
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Snapshot(_) => Category::Leaderboard,
            Self::Trade(_) => Category::Trades,
            Self::Analytics(_) => Category::Analytics,
            Self::ModelAnalytics(_) => Category::ModelAnalytics,
            Self::Conversation(_) => Category::Conversations,
            Self::Account(_) => Category::AccountTotals,
            Self::Inception(_) => Category::SinceInception,
            Self::Price(_) => Category::Prices,
        }
    }

    /// Trades and conversations are immutable facts; everything else is
    /// point-in-time state keyed so that replays replace.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        match self {
            Self::Trade(_) | Self::Conversation(_) => WriteMode::InsertOrIgnore,
            _ => WriteMode::Upsert,
        }
    }

    /// Natural key identifying the record within its table.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Snapshot(s) => s.latest_key(),
            Self::Trade(t) => t.id.to_string(),
            Self::Analytics(a) => a.key(),
            Self::ModelAnalytics(d) => d.agent_id.to_string(),
            Self::Conversation(c) => c.id.clone(),
            Self::Account(a) => a.id.clone(),
            Self::Inception(v) => v.id.clone(),
            Self::Price(p) => p.symbol.clone(),
        }
    }
}

/// Result of writing one record to one sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Upserted, whether or not a previous row existed.
    Upserted,
    /// Inserted a row that did not exist before.
    Inserted,
    /// Key already present; nothing new was stored.
    Ignored,
}

impl WriteOutcome {
    #[must_use]
    pub fn was_new(self) -> bool {
        matches!(self, Self::Inserted)
    }
}
