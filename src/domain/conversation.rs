//! Agent decision records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::CanonicalId;

/// The primary trading decision extracted from one conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// Uppercased upstream signal, `HOLD` when nothing is active.
    pub signal: String,
    pub symbol: Option<String>,
    /// Confidence as a percentage.
    pub confidence: Option<f64>,
}

impl Decision {
    pub const HOLD: &'static str = "HOLD";

    #[must_use]
    pub fn hold() -> Self {
        Self {
            signal: Self::HOLD.to_string(),
            symbol: None,
            confidence: None,
        }
    }

    #[must_use]
    pub fn is_hold(&self) -> bool {
        self.signal == Self::HOLD
    }
}

/// One agent invocation: its reasoning and the decision it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationRecord {
    pub id: String,
    pub agent_id: CanonicalId,
    pub timestamp: DateTime<Utc>,
    pub decision: Decision,
    pub reasoning: String,
    pub chain_of_thought: String,
    pub raw: serde_json::Value,
}
