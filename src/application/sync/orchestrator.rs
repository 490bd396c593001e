//! Sync orchestrator: concurrent, all-settled fan-out over categories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::pipeline::{self, PipelineContext};
use super::reconcile::Reconciler;
use super::schedule::JobSchedule;
use super::writer::SinkWriter;
use crate::domain::{Category, CategoryReport, CategoryStatus, JobRun, SyncSummary};
use crate::error::Result;
use crate::port::{AgentDirectory, JobLedger, SyncRequest, SyncTrigger, UpstreamSource};

/// Runs sync cycles.
///
/// Every requested category gets its own task. A category that fails,
/// or whose task panics, is reported as failed; it never cancels the others.
///
/// Cycles never overlap: a cycle requested while another runs waits for it
/// and then sees the runs it recorded.
pub struct Orchestrator<D> {
    upstream: Arc<dyn UpstreamSource>,
    writer: Arc<SinkWriter>,
    directory: Arc<D>,
    ledger: Arc<dyn JobLedger>,
    schedule: JobSchedule,
    cycle: Mutex<()>,
}

impl<D: AgentDirectory + 'static> Orchestrator<D> {
    pub fn new(
        upstream: Arc<dyn UpstreamSource>,
        writer: SinkWriter,
        directory: Arc<D>,
        ledger: Arc<dyn JobLedger>,
        schedule: JobSchedule,
    ) -> Self {
        Self {
            upstream,
            writer: Arc::new(writer),
            directory,
            ledger,
            schedule,
            cycle: Mutex::new(()),
        }
    }

    /// Categories of `request` split into due and not-due.
    async fn partition(&self, request: &SyncRequest) -> Result<(Vec<Category>, Vec<Category>)> {
        let categories = request.resolved_categories();
        if request.force {
            return Ok((categories, Vec::new()));
        }

        let now = Utc::now();
        let mut due = Vec::new();
        let mut not_due = Vec::new();
        for category in categories {
            let last = self.ledger.last_run(category).await?;
            if self.schedule.is_due(category, last.as_ref(), now) {
                due.push(category);
            } else {
                not_due.push(category);
            }
        }
        Ok((due, not_due))
    }

    /// Run one sync cycle.
    ///
    /// # Errors
    /// Returns an error only when the cycle cannot start: the agent list or
    /// the job ledger is unreadable.
    pub async fn run_cycle(&self, request: SyncRequest) -> Result<SyncSummary> {
        let _cycle = self.cycle.lock().await;
        let started_at = Utc::now();
        let reconciler = Arc::new(Reconciler::load(self.directory.as_ref()).await?);
        let (due, not_due) = self.partition(&request).await?;

        info!(
            due = ?due,
            not_due = ?not_due,
            force = request.force,
            "Starting sync cycle"
        );

        let ctx = PipelineContext {
            upstream: Arc::clone(&self.upstream),
            writer: Arc::clone(&self.writer),
            reconciler,
            cycle: started_at,
        };

        let mut tasks = JoinSet::new();
        for category in &due {
            let category = *category;
            let ctx = ctx.clone();
            tasks.spawn(async move { (category, pipeline::run(category, ctx).await) });
        }

        let mut reports: Vec<CategoryReport> =
            not_due.into_iter().map(CategoryReport::not_due).collect();
        let mut finished = Vec::with_capacity(due.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((category, report)) => {
                    finished.push(category);
                    reports.push(report);
                }
                Err(e) => error!(error = %e, "Category task aborted"),
            }
        }
        for category in due.iter().filter(|c| !finished.contains(c)) {
            reports.push(CategoryReport::failed(*category, "pipeline task aborted"));
        }

        let finished_at = Utc::now();
        for report in reports
            .iter()
            .filter(|r| r.status == CategoryStatus::Succeeded)
        {
            let run = JobRun {
                category: report.category,
                last_run: started_at,
                status: report.status,
                synced: report.synced,
            };
            if let Err(e) = self.ledger.record_run(&run).await {
                warn!(category = %report.category, error = %e, "Failed to record job run");
            }
        }

        let summary = SyncSummary::from_reports(started_at, finished_at, reports);
        info!(
            synced = summary.totals.synced,
            skipped = summary.totals.skipped,
            failed = summary.totals.failed,
            categories_failed = summary.totals.categories_failed,
            duration_ms = summary.duration_ms,
            "Sync cycle complete"
        );
        Ok(summary)
    }
}

#[async_trait]
impl<D: AgentDirectory + 'static> SyncTrigger for Orchestrator<D> {
    async fn run(&self, request: SyncRequest) -> Result<SyncSummary> {
        self.run_cycle(request).await
    }

    async fn status(&self) -> Result<Vec<JobRun>> {
        self.ledger.list_runs().await
    }
}
