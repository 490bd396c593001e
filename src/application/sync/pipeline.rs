//! One category's fetch, transform and write pipeline.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};

use super::reconcile::Reconciler;
use super::transform::{transform_batch, TransformContext, MODEL_DETAILS_KEY};
use super::writer::SinkWriter;
use crate::domain::{Category, CategoryReport, CategoryStatus, PipelineState};
use crate::port::UpstreamSource;

/// Shared handles for the pipelines of one cycle.
#[derive(Clone)]
pub struct PipelineContext {
    pub upstream: Arc<dyn UpstreamSource>,
    pub writer: Arc<SinkWriter>,
    pub reconciler: Arc<Reconciler>,
    pub cycle: DateTime<Utc>,
}

/// State of a running pipeline and the report it is filling in.
struct Run {
    state: PipelineState,
    report: CategoryReport,
    started: Instant,
}

impl Run {
    fn new(category: Category) -> Self {
        Self {
            state: PipelineState::Pending,
            report: CategoryReport::new(category),
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: PipelineState) {
        if !self.state.can_transition_to(next) {
            warn!(
                category = %self.report.category,
                from = ?self.state,
                to = ?next,
                "Ignoring invalid pipeline transition"
            );
            return;
        }
        debug!(category = %self.report.category, from = ?self.state, to = ?next, "Pipeline transition");
        self.state = next;
    }

    fn fail(mut self, reason: String) -> CategoryReport {
        error!(category = %self.report.category, error = %reason, "Category sync failed");
        self.advance(PipelineState::Failed);
        self.report.status = CategoryStatus::Failed;
        self.report.errors.push(reason);
        self.finish()
    }

    fn finish(mut self) -> CategoryReport {
        self.report.duration_ms = self.started.elapsed().as_millis() as u64;
        self.report
    }
}

/// Fetch every upstream model's analytics into one envelope.
///
/// A model that cannot be fetched is counted as failed and left out.
/// Returns `None` when every model failed.
async fn fetch_model_details(ctx: &PipelineContext, report: &mut CategoryReport) -> Option<Value> {
    let models = ctx.upstream.models();
    let mut details = Vec::with_capacity(models.len());
    for model in models {
        match ctx.upstream.fetch_model_analytics(&model).await {
            Ok(payload) => details.push(json!({"model_id": model, "payload": payload})),
            Err(e) => {
                warn!(model = %model, error = %e, "Model analytics fetch failed");
                report.failed += 1;
                report.errors.push(format!("{model}: {e}"));
            }
        }
    }
    if details.is_empty() && report.failed > 0 {
        return None;
    }

    let mut envelope = Map::new();
    envelope.insert(MODEL_DETAILS_KEY.to_string(), Value::Array(details));
    Some(Value::Object(envelope))
}

/// Run one category to a terminal state.
///
/// Never returns an error: every failure ends up in the report.
pub async fn run(category: Category, ctx: PipelineContext) -> CategoryReport {
    let mut run = Run::new(category);

    run.advance(PipelineState::Fetching);
    let payload = if category == Category::ModelAnalytics {
        match fetch_model_details(&ctx, &mut run.report).await {
            Some(payload) => payload,
            None => return run.fail("every model analytics fetch failed".into()),
        }
    } else {
        match ctx.upstream.fetch(category).await {
            Ok(payload) => payload,
            Err(e) => return run.fail(e.to_string()),
        }
    };

    run.advance(PipelineState::Transforming);
    let transform_ctx = TransformContext::new(&ctx.reconciler, ctx.cycle);
    let batch = match transform_batch(category, &payload, &transform_ctx) {
        Ok(batch) => batch,
        Err(e) => return run.fail(e.to_string()),
    };
    run.report.skipped = batch.skipped.len() as u64;

    run.advance(PipelineState::Writing);
    ctx.writer.write_batch(&batch.records, &mut run.report).await;

    if run.report.failed > 0 && run.report.synced == 0 {
        let reason = format!("all {} record writes failed", run.report.failed);
        return run.fail(reason);
    }

    run.advance(PipelineState::Succeeded);
    let report = run.finish();
    info!(
        category = %category,
        synced = report.synced,
        skipped = report.skipped,
        failed = report.failed,
        new = report.new_records,
        duration_ms = report.duration_ms,
        "Category synced"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::Sink;
    use crate::testkit::sink::MemorySink;
    use crate::testkit::upstream::ScriptedUpstream;
    use serde_json::json;

    fn context(upstream: ScriptedUpstream, sink: Arc<MemorySink>) -> PipelineContext {
        PipelineContext {
            upstream: Arc::new(upstream),
            writer: Arc::new(SinkWriter::new(vec![sink as Arc<dyn Sink>])),
            reconciler: Arc::new(Reconciler::with_static_aliases()),
            cycle: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unmapped_record_is_skipped_not_failed() {
        let upstream = ScriptedUpstream::new().with_payload(
            Category::Leaderboard,
            json!({"leaderboard": [
                {"aiModelId": "claude-sonnet-4-5"},
                {"aiModelId": "deepseek-chat-v3.1"},
                {"aiModelId": "unknown-llm"},
                {"aiModelId": "gpt-5"},
                {"aiModelId": "grok-4"}
            ]}),
        );
        let sink = Arc::new(MemorySink::primary("memory"));

        let report = run(Category::Leaderboard, context(upstream, sink.clone())).await;

        assert_eq!(report.status, CategoryStatus::Succeeded);
        assert_eq!(report.synced, 4);
        assert_eq!(report.skipped, 1);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_fails_category() {
        let upstream = ScriptedUpstream::new().with_failure(Category::Trades, 503);
        let sink = Arc::new(MemorySink::primary("memory"));

        let report = run(Category::Trades, context(upstream, sink.clone())).await;

        assert_eq!(report.status, CategoryStatus::Failed);
        assert_eq!(report.errors.len(), 1);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn payload_without_envelope_fails_category() {
        let upstream = ScriptedUpstream::new().with_payload(Category::Analytics, json!({"nope": 1}));
        let sink = Arc::new(MemorySink::primary("memory"));

        let report = run(Category::Analytics, context(upstream, sink)).await;

        assert_eq!(report.status, CategoryStatus::Failed);
        assert!(report.errors[0].contains("analytics"));
    }

    #[tokio::test]
    async fn model_analytics_fetches_each_model() {
        let upstream = ScriptedUpstream::new()
            .with_model_payload("gpt-5", json!({"sharpe_ratio": 1.2}))
            .with_model_failure("grok-4", 502)
            .with_model_payload("qwen3-max", json!({"sharpe_ratio": -0.3}));
        let sink = Arc::new(MemorySink::primary("memory"));

        let report = run(Category::ModelAnalytics, context(upstream.clone(), sink.clone())).await;

        assert_eq!(report.status, CategoryStatus::Succeeded);
        assert_eq!(report.synced, 2);
        assert_eq!(report.failed, 1);
        assert!(report.errors[0].starts_with("grok-4: "));
        assert_eq!(upstream.fetch_count(Category::ModelAnalytics), 3);
        assert_eq!(sink.records(Category::ModelAnalytics).len(), 2);
    }

    #[tokio::test]
    async fn model_analytics_fails_when_no_model_answers() {
        let upstream = ScriptedUpstream::new()
            .with_model_failure("gpt-5", 500)
            .with_model_failure("grok-4", 500);
        let sink = Arc::new(MemorySink::primary("memory"));

        let report = run(Category::ModelAnalytics, context(upstream, sink.clone())).await;

        assert_eq!(report.status, CategoryStatus::Failed);
        assert_eq!(report.errors.len(), 3);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn every_write_failing_fails_category() {
        let upstream = ScriptedUpstream::new()
            .with_payload(Category::Prices, json!({"prices": [{"symbol": "BTC", "price": 1}]}));
        let sink = Arc::new(MemorySink::primary("memory"));
        sink.fail_always();

        let report = run(Category::Prices, context(upstream, sink)).await;

        assert_eq!(report.status, CategoryStatus::Failed);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 2);
    }
}
