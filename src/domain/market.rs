//! Market-wide values: asset prices and since-inception NAV.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::CanonicalId;

/// Latest price of one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Net asset value of an agent since the competition started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InceptionValue {
    pub id: String,
    pub agent_id: CanonicalId,
    pub nav_since_inception: f64,
    pub inception_date: DateTime<Utc>,
    pub num_invocations: i64,
}
