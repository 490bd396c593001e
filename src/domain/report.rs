//! Per-category results and the aggregated sync summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::Category;

/// Lifecycle of one category pipeline within a sync cycle.
///
/// `Pending -> Fetching -> Transforming -> Writing -> Succeeded`, with
/// `Failed` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Pending,
    Fetching,
    Transforming,
    Writing,
    Succeeded,
    Failed,
}

impl PipelineState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Fetching, Transforming)
                | (Transforming, Writing)
                | (Writing, Succeeded)
                | (Pending | Fetching | Transforming | Writing, Failed)
        )
    }
}

/// Final status of a category in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryStatus {
    Succeeded,
    Failed,
    /// Skipped by the job schedule; nothing was fetched.
    NotDue,
}

impl CategoryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::NotDue => "not-due",
        }
    }
}

impl std::str::FromStr for CategoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "not-due" => Ok(Self::NotDue),
            other => Err(format!("unknown category status '{other}'")),
        }
    }
}

/// Outcome of one category pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub status: CategoryStatus,
    /// Records written to the primary sink.
    pub synced: u64,
    /// Records skipped as malformed or unmapped.
    pub skipped: u64,
    /// Records whose fetch or primary write failed.
    pub failed: u64,
    /// Records that did not exist in the primary sink before this run.
    pub new_records: u64,
    /// Mirror-sink write failures; these do not fail the record.
    pub mirror_failures: u64,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl CategoryReport {
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            status: CategoryStatus::Succeeded,
            synced: 0,
            skipped: 0,
            failed: 0,
            new_records: 0,
            mirror_failures: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    #[must_use]
    pub fn not_due(category: Category) -> Self {
        Self {
            status: CategoryStatus::NotDue,
            ..Self::new(category)
        }
    }

    #[must_use]
    pub fn failed(category: Category, error: impl Into<String>) -> Self {
        Self {
            status: CategoryStatus::Failed,
            errors: vec![error.into()],
            ..Self::new(category)
        }
    }
}

/// Totals across all categories of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncTotals {
    pub synced: u64,
    pub skipped: u64,
    pub failed: u64,
    pub new_records: u64,
    pub categories_failed: u64,
}

/// Aggregated outcome of one sync run.
///
/// `success` means the run itself completed; per-category health lives in
/// `categories`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncSummary {
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub totals: SyncTotals,
    pub categories: Vec<CategoryReport>,
}

impl SyncSummary {
    /// Build a summary from finished category reports, sorted by category.
    #[must_use]
    pub fn from_reports(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        mut categories: Vec<CategoryReport>,
    ) -> Self {
        categories.sort_by_key(|r| r.category);
        let totals = categories.iter().fold(SyncTotals::default(), |mut t, r| {
            t.synced += r.synced;
            t.skipped += r.skipped;
            t.failed += r.failed;
            t.new_records += r.new_records;
            if r.status == CategoryStatus::Failed {
                t.categories_failed += 1;
            }
            t
        });
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            success: true,
            started_at,
            finished_at,
            duration_ms,
            totals,
            categories,
        }
    }

    #[must_use]
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories.iter().find(|r| r.category == category)
    }
}

/// Last recorded run of one category's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRun {
    pub category: Category,
    pub last_run: DateTime<Utc>,
    pub status: CategoryStatus,
    pub synced: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_follows_pipeline_order() {
        use PipelineState::*;
        assert!(Pending.can_transition_to(Fetching));
        assert!(Fetching.can_transition_to(Transforming));
        assert!(Transforming.can_transition_to(Writing));
        assert!(Writing.can_transition_to(Succeeded));
        assert!(Fetching.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Writing));
        assert!(!Succeeded.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Fetching));
    }

    #[test]
    fn summary_totals_and_sorts_reports() {
        let start = Utc::now();
        let mut trades = CategoryReport::new(Category::Trades);
        trades.synced = 4;
        trades.skipped = 1;
        let mut board = CategoryReport::new(Category::Leaderboard);
        board.synced = 6;
        let failed = CategoryReport::failed(Category::Analytics, "upstream down");

        let summary = SyncSummary::from_reports(start, start, vec![trades, failed, board]);

        assert!(summary.success);
        assert_eq!(summary.totals.synced, 10);
        assert_eq!(summary.totals.skipped, 1);
        assert_eq!(summary.totals.categories_failed, 1);
        assert_eq!(summary.categories[0].category, Category::Leaderboard);
        assert_eq!(summary.categories[2].category, Category::Analytics);
    }

    #[test]
    fn not_due_report_serializes_kebab_status() {
        let report = CategoryReport::not_due(Category::SinceInception);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "not-due");
        assert_eq!(json["category"], "since-inception");
    }
}
