//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical agent identifier (e.g. `claude-1`).
///
/// Exactly one per competing agent. Upstream aliases map onto it many-to-one
/// through the reconciler; nothing else constructs one from upstream text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Create a new `CanonicalId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the canonical ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CanonicalId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Trade identifier, either upstream-provided or synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeId(String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Synthesize an id for an upstream trade that carries none.
    ///
    /// Combines the millisecond timestamp with a random suffix so two
    /// synthesized ids in the same millisecond still differ.
    #[must_use]
    pub fn synthesize(timestamp_ms: i64) -> Self {
        let suffix: u32 = rand::random();
        Self(format!("trade-{timestamp_ms}-{suffix:08x}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data category synchronized from the upstream API.
///
/// Each category is fetched, transformed and written by its own pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Leaderboard,
    Trades,
    Analytics,
    ModelAnalytics,
    Conversations,
    AccountTotals,
    SinceInception,
    Prices,
}

impl Category {
    /// Every category, in reporting order.
    pub const ALL: [Category; 8] = [
        Category::Leaderboard,
        Category::Trades,
        Category::Analytics,
        Category::ModelAnalytics,
        Category::Conversations,
        Category::AccountTotals,
        Category::SinceInception,
        Category::Prices,
    ];

    /// Stable kebab-case name used in config, reports and the job ledger.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Leaderboard => "leaderboard",
            Self::Trades => "trades",
            Self::Analytics => "analytics",
            Self::ModelAnalytics => "model-analytics",
            Self::Conversations => "conversations",
            Self::AccountTotals => "account-totals",
            Self::SinceInception => "since-inception",
            Self::Prices => "prices",
        }
    }

    /// Path of the upstream endpoint, relative to the API base URL.
    ///
    /// Model analytics are fetched per model, below this path.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Leaderboard => "leaderboard",
            Self::Trades => "trades",
            Self::Analytics | Self::ModelAnalytics => "analytics",
            Self::Conversations => "conversations",
            Self::AccountTotals => "account-totals",
            Self::SinceInception => "since-inception-values",
            Self::Prices => "crypto-prices",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_kebab_and_snake_case() {
        assert_eq!("account-totals".parse::<Category>(), Ok(Category::AccountTotals));
        assert_eq!("Since_Inception".parse::<Category>(), Ok(Category::SinceInception));
        assert_eq!("model_analytics".parse::<Category>(), Ok(Category::ModelAnalytics));
        assert!("positions".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_kebab_case() {
        let json = serde_json::to_string(&Category::AccountTotals).unwrap();
        assert_eq!(json, "\"account-totals\"");
    }

    #[test]
    fn synthesized_trade_ids_are_distinct_within_same_millisecond() {
        let a = TradeId::synthesize(1_700_000_000_000);
        let b = TradeId::synthesize(1_700_000_000_000);
        assert!(a.as_str().starts_with("trade-1700000000000-"));
        assert_ne!(a, b);
    }
}
