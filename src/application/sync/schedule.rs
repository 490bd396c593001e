//! Per-category minimum run intervals.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{Category, JobRun};

/// Default minimum interval of a category, in minutes.
#[must_use]
pub const fn default_interval_mins(category: Category) -> u64 {
    match category {
        Category::Analytics | Category::ModelAnalytics => 60,
        Category::SinceInception => 1440,
        Category::Leaderboard
        | Category::Trades
        | Category::Conversations
        | Category::AccountTotals
        | Category::Prices => 5,
    }
}

/// How often each category may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSchedule {
    intervals: BTreeMap<Category, Duration>,
}

impl Default for JobSchedule {
    fn default() -> Self {
        Self::new(
            Category::ALL
                .into_iter()
                .map(|c| (c, Duration::from_secs(default_interval_mins(c) * 60))),
        )
    }
}

impl JobSchedule {
    pub fn new(intervals: impl IntoIterator<Item = (Category, Duration)>) -> Self {
        Self {
            intervals: intervals.into_iter().collect(),
        }
    }

    /// Minimum interval for `category`; categories without one are always due.
    #[must_use]
    pub fn interval(&self, category: Category) -> Duration {
        self.intervals
            .get(&category)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether `category` should run at `now` given its last successful run.
    #[must_use]
    pub fn is_due(&self, category: Category, last: Option<&JobRun>, now: DateTime<Utc>) -> bool {
        let Some(last) = last else {
            return true;
        };
        let elapsed = (now - last.last_run).to_std().unwrap_or(Duration::ZERO);
        elapsed >= self.interval(category)
    }
}
