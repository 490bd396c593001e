//! Agent conversations and the decision each one produced.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::lenient::{number, opt_f64, opt_string, text, timestamp};
use super::{decode, malformed, TransformContext};
use crate::domain::{Category, ConversationRecord, Decision, Record};
use crate::error::SyncError;

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default, deserialize_with = "opt_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    model_id: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    timestamp: Option<f64>,
}

/// Primary decision of one `llm_response`.
///
/// The response holds one entry per coin, either as an object keyed by
/// coin or as an array. The first entry, in payload order, whose signal is
/// not `hold` wins; when every entry holds (or the response is absent) the
/// decision is `HOLD` with no symbol or confidence.
#[must_use]
pub fn extract_decision(llm_response: Option<&Value>) -> Decision {
    let entries: Vec<(Option<&str>, &Map<String, Value>)> = match llm_response {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(coin, v)| v.as_object().map(|o| (Some(coin.as_str()), o)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_object().map(|o| (None, o)))
            .collect(),
        _ => return Decision::hold(),
    };

    entries
        .into_iter()
        .find_map(|(key, entry)| {
            let signal = entry.get("signal")?.as_str()?.trim();
            if signal.is_empty() || signal.eq_ignore_ascii_case("hold") {
                return None;
            }
            let symbol = entry
                .get("coin")
                .and_then(Value::as_str)
                .or(key)
                .map(str::to_string);
            Some(Decision {
                signal: signal.to_ascii_uppercase(),
                symbol,
                confidence: entry.get("confidence").and_then(number).map(|c| c * 100.0),
            })
        })
        .unwrap_or_else(Decision::hold)
}

pub(super) fn transform(item: &Value, ctx: &TransformContext<'_>) -> Result<Record, SyncError> {
    const CATEGORY: Category = Category::Conversations;

    let raw: RawConversation = decode(CATEGORY, item)?;
    let agent_id = ctx.agent(CATEGORY, raw.model_id.as_deref())?;
    let timestamp = raw
        .timestamp
        .and_then(timestamp)
        .ok_or_else(|| malformed(CATEGORY, "missing timestamp"))?;

    let id = raw
        .id
        .unwrap_or_else(|| format!("{agent_id}-{}", timestamp.timestamp()));

    Ok(Record::Conversation(ConversationRecord {
        id,
        agent_id,
        timestamp,
        decision: extract_decision(item.get("llm_response")),
        reasoning: text(item.get("cot_trace_summary")),
        chain_of_thought: text(item.get("cot_trace")),
        raw: item.clone(),
    }))
}
