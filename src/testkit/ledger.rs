//! In-memory job ledger.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Category, JobRun};
use crate::error::Result;
use crate::port::JobLedger;

#[derive(Debug, Default)]
pub struct MemoryLedger {
    runs: RwLock<BTreeMap<Category, JobRun>>,
}

#[async_trait]
impl JobLedger for MemoryLedger {
    async fn last_run(&self, category: Category) -> Result<Option<JobRun>> {
        Ok(self.runs.read().get(&category).cloned())
    }

    async fn record_run(&self, run: &JobRun) -> Result<()> {
        self.runs.write().insert(run.category, run.clone());
        Ok(())
    }

    async fn list_runs(&self) -> Result<Vec<JobRun>> {
        Ok(self.runs.read().values().cloned().collect())
    }
}
