//! Sync schedule settings.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::application::sync::schedule::{default_interval_mins, JobSchedule};
use crate::domain::Category;

/// How often the runner ticks and how often each category may run.
///
/// ```toml
/// [schedule]
/// interval_secs = 60
///
/// [schedule.intervals]
/// analytics = 30
/// since-inception = 720
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between runner ticks.
    pub interval_secs: u64,
    /// Per-category minimum interval in minutes; unlisted categories keep
    /// their default cadence.
    pub intervals: BTreeMap<Category, u64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            intervals: BTreeMap::new(),
        }
    }
}

impl ScheduleConfig {
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Minutes between runs of `category`.
    #[must_use]
    pub fn interval_mins(&self, category: Category) -> u64 {
        self.intervals
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_interval_mins(category))
    }

    #[must_use]
    pub fn job_schedule(&self) -> JobSchedule {
        JobSchedule::new(
            Category::ALL
                .into_iter()
                .map(|c| (c, Duration::from_secs(self.interval_mins(c) * 60))),
        )
    }
}
