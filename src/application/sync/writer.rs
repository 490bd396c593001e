//! Sink writer: fans each record out to every configured sink.
//!
//! Records are written one at a time, in batch order. A failed write is
//! caught and counted against that record only; the batch always runs to
//! the end.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{CategoryReport, Record, WriteOutcome};
use crate::error::SyncError;
use crate::port::{Sink, SinkRole};

/// Result of writing one record to every sink.
#[derive(Debug)]
pub struct RecordWrite {
    /// Primary-sink outcome. `Ok(None)` when no primary sink is configured.
    pub primary: Result<Option<WriteOutcome>, SyncError>,
    pub mirror_failures: Vec<SyncError>,
}

/// Owns write access to the sinks for a sync cycle.
pub struct SinkWriter {
    sinks: Vec<Arc<dyn Sink>>,
}

impl SinkWriter {
    /// Primary sinks are always written before mirrors.
    #[must_use]
    pub fn new(mut sinks: Vec<Arc<dyn Sink>>) -> Self {
        sinks.sort_by_key(|s| s.role() == SinkRole::Mirror);
        Self { sinks }
    }

    #[must_use]
    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Write one record.
    ///
    /// Mirrors only receive records the primary accepted, so the edge cache
    /// never holds a row the source of truth lacks.
    pub async fn write_record(&self, record: &Record) -> RecordWrite {
        let mut primary: Option<WriteOutcome> = None;
        let mut mirror_failures = Vec::new();

        for sink in &self.sinks {
            let outcome = sink.write(record).await.map_err(|e| SyncError::SinkWrite {
                sink: sink.name(),
                key: record.key(),
                reason: e.to_string(),
            });

            match (sink.role(), outcome) {
                (SinkRole::Primary, Ok(outcome)) => {
                    // With several primaries the record is new if any of them say so.
                    primary = Some(match primary {
                        Some(WriteOutcome::Inserted) => WriteOutcome::Inserted,
                        _ => outcome,
                    });
                }
                (SinkRole::Primary, Err(err)) => {
                    return RecordWrite {
                        primary: Err(err),
                        mirror_failures,
                    };
                }
                (SinkRole::Mirror, Ok(_)) => {}
                (SinkRole::Mirror, Err(err)) => mirror_failures.push(err),
            }
        }

        RecordWrite {
            primary: Ok(primary),
            mirror_failures,
        }
    }

    /// Write a batch and tally the outcome into `report`.
    pub async fn write_batch(&self, records: &[Record], report: &mut CategoryReport) {
        for record in records {
            let write = self.write_record(record).await;

            for err in &write.mirror_failures {
                warn!(category = %report.category, error = %err, "Mirror write failed");
            }
            report.mirror_failures += write.mirror_failures.len() as u64;

            match write.primary {
                Ok(outcome) => {
                    report.synced += 1;
                    if outcome.is_some_and(|o| o.was_new()) {
                        report.new_records += 1;
                    }
                }
                Err(err) => {
                    warn!(category = %report.category, error = %err, "Record write failed");
                    report.failed += 1;
                    report.errors.push(err.to_string());
                }
            }
        }

        debug!(
            category = %report.category,
            synced = report.synced,
            failed = report.failed,
            new = report.new_records,
            "Batch written"
        );
    }
}

impl std::fmt::Debug for SinkWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkWriter")
            .field("sinks", &self.sink_names())
            .finish()
    }
}
