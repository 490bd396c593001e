//! Record transformation: raw upstream payloads into normalized records.
//!
//! Each category module decodes one upstream record shape into typed raw
//! structs (a wrong-typed field fails decoding) and then maps it onto a
//! domain record. A record that cannot be decoded is malformed; a record
//! whose agent cannot be resolved is unmapped. Both are skipped, never
//! fatal to the batch.

mod accounts;
mod analytics;
mod conversations;
mod leaderboard;
pub mod lenient;
mod market;
mod trades;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::reconcile::Reconciler;
use crate::domain::{CanonicalId, Category, Record};
use crate::error::SyncError;

pub use conversations::extract_decision;

/// Inputs shared by every record of one batch.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub reconciler: &'a Reconciler,
    /// Start of the sync cycle; stamps records that carry no time.
    pub cycle: DateTime<Utc>,
    /// `serverTime` of the payload, when the upstream sends one.
    pub server_time: Option<DateTime<Utc>>,
}

impl<'a> TransformContext<'a> {
    #[must_use]
    pub fn new(reconciler: &'a Reconciler, cycle: DateTime<Utc>) -> Self {
        Self {
            reconciler,
            cycle,
            server_time: None,
        }
    }

    /// Canonical id for an upstream model id.
    fn agent(&self, category: Category, upstream: Option<&str>) -> Result<CanonicalId, SyncError> {
        let upstream = upstream.ok_or_else(|| SyncError::MalformedRecord {
            category,
            reason: "missing model id".into(),
        })?;
        self.reconciler
            .resolve(upstream)
            .ok_or_else(|| SyncError::UnmappedIdentifier {
                upstream_id: upstream.to_string(),
            })
    }
}

/// Normalized records of one category plus the records that were skipped.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<Record>,
    pub skipped: Vec<SyncError>,
}

impl Batch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a raw record into its typed shape.
fn decode<T: DeserializeOwned>(category: Category, item: &Value) -> Result<T, SyncError> {
    T::deserialize(item).map_err(|e| SyncError::MalformedRecord {
        category,
        reason: e.to_string(),
    })
}

fn malformed(category: Category, reason: impl Into<String>) -> SyncError {
    SyncError::MalformedRecord {
        category,
        reason: reason.into(),
    }
}

/// Envelope key under which the pipeline gathers per-model payloads.
pub const MODEL_DETAILS_KEY: &str = "models";

/// Envelope keys that may hold a category's record array.
const fn envelope_keys(category: Category) -> &'static [&'static str] {
    match category {
        Category::Leaderboard => &["leaderboard", "data"],
        Category::Trades => &["trades", "data"],
        Category::Analytics => &["analytics", "data"],
        Category::ModelAnalytics => &[MODEL_DETAILS_KEY],
        Category::Conversations => &["conversations", "data"],
        Category::AccountTotals => &["accountTotals", "accounts", "data"],
        Category::SinceInception => &["sinceInceptionValues", "since_inception_values", "data"],
        Category::Prices => &["prices", "data"],
    }
}

/// Pull the record list out of a category payload.
///
/// Accepts a bare array, or an object holding an array under one of the
/// category's envelope keys. An object keyed by symbol is accepted for
/// prices.
///
/// # Errors
/// Returns [`SyncError::MalformedRecord`] when no record list can be found.
pub fn extract_items(category: Category, payload: &Value) -> Result<Vec<Value>, SyncError> {
    if let Value::Array(items) = payload {
        return Ok(items.clone());
    }
    let Value::Object(envelope) = payload else {
        return Err(malformed(category, "payload is not a JSON object or array"));
    };

    for key in envelope_keys(category) {
        match envelope.get(*key) {
            Some(Value::Array(items)) => return Ok(items.clone()),
            Some(Value::Object(map)) if category == Category::Prices => {
                return Ok(market::price_map_items(map));
            }
            _ => {}
        }
    }

    Err(malformed(
        category,
        format!(
            "payload has no record list under {}",
            envelope_keys(category).join(" / ")
        ),
    ))
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "serverTime", default, deserialize_with = "lenient::opt_f64")]
    server_time: Option<f64>,
}

fn server_time(payload: &Value) -> Option<DateTime<Utc>> {
    if !payload.is_object() {
        return None;
    }
    Envelope::deserialize(payload)
        .ok()
        .and_then(|e| e.server_time)
        .and_then(lenient::timestamp)
}

/// Transform one raw record.
///
/// # Errors
/// Returns [`SyncError::MalformedRecord`] or
/// [`SyncError::UnmappedIdentifier`]; callers skip the record.
pub fn transform_record(
    category: Category,
    item: &Value,
    index: usize,
    ctx: &TransformContext<'_>,
) -> Result<Record, SyncError> {
    match category {
        Category::Leaderboard => leaderboard::transform(item, index, ctx),
        Category::Trades => trades::transform(item, ctx),
        Category::Analytics => analytics::transform(item, ctx),
        Category::ModelAnalytics => analytics::transform_detail(item, ctx),
        Category::Conversations => conversations::transform(item, ctx),
        Category::AccountTotals => accounts::transform(item, index, ctx),
        Category::SinceInception => market::transform_inception(item, ctx),
        Category::Prices => market::transform_price(item, ctx),
    }
}

/// Transform every record of a payload, skipping the ones that fail.
///
/// # Errors
/// Returns [`SyncError::MalformedRecord`] only when the payload holds no
/// record list at all.
pub fn transform_batch(
    category: Category,
    payload: &Value,
    ctx: &TransformContext<'_>,
) -> Result<Batch, SyncError> {
    let items = extract_items(category, payload)?;
    let ctx = TransformContext {
        server_time: server_time(payload),
        ..*ctx
    };

    let mut batch = Batch::default();
    for (index, item) in items.iter().enumerate() {
        match transform_record(category, item, index, &ctx) {
            Ok(record) => batch.records.push(record),
            Err(err) => {
                warn!(category = %category, index, error = %err, "Skipping record");
                batch.skipped.push(err);
            }
        }
    }
    Ok(batch)
}
