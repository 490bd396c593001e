//! Sync trigger port.
//!
//! Inbound adapters (HTTP trigger, CLI) drive the orchestrator through
//! [`SyncTrigger`] without knowing how it is wired.

use async_trait::async_trait;

use crate::domain::{Category, JobRun, SyncSummary};
use crate::error::Result;

/// What a caller asks one sync run to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Categories to run. Empty means every category.
    pub categories: Vec<Category>,
    /// Run categories even when the schedule says they are not due.
    pub force: bool,
}

impl SyncRequest {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Requested categories, deduplicated, in reporting order.
    #[must_use]
    pub fn resolved_categories(&self) -> Vec<Category> {
        if self.categories.is_empty() {
            return Category::ALL.to_vec();
        }
        let mut categories = self.categories.clone();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Entry point for running and inspecting syncs.
#[async_trait]
pub trait SyncTrigger: Send + Sync {
    /// Run one sync cycle.
    ///
    /// Returns `Err` only when the run cannot start at all; category-level
    /// failures are reported inside the summary.
    async fn run(&self, request: SyncRequest) -> Result<SyncSummary>;

    /// Last recorded run per category.
    async fn status(&self) -> Result<Vec<JobRun>>;
}
