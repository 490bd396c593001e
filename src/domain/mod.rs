//! Pure domain types for the synchronization core.
//!
//! Nothing here performs I/O. Records are already normalized: every agent is
//! a [`CanonicalId`] and every numeric field has a concrete value or an
//! explicit `Option`.

pub mod account;
pub mod agent;
pub mod analytics;
pub mod conversation;
pub mod id;
pub mod market;
pub mod record;
pub mod report;
pub mod snapshot;
pub mod trade;

pub use account::{AccountPosition, AccountTotal};
pub use agent::Agent;
pub use analytics::{AnalyticsAggregate, ModelAnalyticsDetail};
pub use conversation::{ConversationRecord, Decision};
pub use id::{CanonicalId, Category, TradeId};
pub use market::{InceptionValue, PriceQuote};
pub use record::{Record, WriteMode, WriteOutcome};
pub use report::{
    CategoryReport, CategoryStatus, JobRun, PipelineState, SyncSummary, SyncTotals,
};
pub use snapshot::LeaderboardSnapshot;
pub use trade::{Side, TradePnl, TradeRecord};
