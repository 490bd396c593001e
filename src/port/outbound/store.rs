//! Relational-store ports used outside the write path.

use std::future::Future;

use async_trait::async_trait;

use crate::domain::{Agent, Category, JobRun};
use crate::error::Result;

/// Registered agents, used to seed the identifier reconciler.
pub trait AgentDirectory: Send + Sync {
    fn list_agents(&self) -> impl Future<Output = Result<Vec<Agent>>> + Send;
}

/// Per-category record of the last completed run.
#[async_trait]
pub trait JobLedger: Send + Sync {
    async fn last_run(&self, category: Category) -> Result<Option<JobRun>>;

    async fn record_run(&self, run: &JobRun) -> Result<()>;

    async fn list_runs(&self) -> Result<Vec<JobRun>>;
}
