//! Sink port: idempotent writes of normalized records.

use async_trait::async_trait;

use crate::domain::{Record, WriteMode, WriteOutcome};
use crate::error::Result;

/// Role a sink plays in a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkRole {
    /// Source of truth. A failed write here fails the record.
    Primary,
    /// Low-latency copy. Failures are logged and tallied only.
    Mirror,
}

/// A store that receives synchronized records.
///
/// Every write is keyed by the record's natural key, so concurrent
/// pipelines writing different categories never conflict.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &'static str;

    fn role(&self) -> SinkRole;

    /// Replace on natural-key conflict.
    async fn upsert(&self, record: &Record) -> Result<()>;

    /// Insert unless the key exists. Returns `true` when a new row was stored.
    async fn insert_or_ignore(&self, record: &Record) -> Result<bool>;

    /// Write with the record's own [`WriteMode`].
    async fn write(&self, record: &Record) -> Result<WriteOutcome> {
        match record.write_mode() {
            WriteMode::Upsert => {
                self.upsert(record).await?;
                Ok(WriteOutcome::Upserted)
            }
            WriteMode::InsertOrIgnore => {
                if self.insert_or_ignore(record).await? {
                    Ok(WriteOutcome::Inserted)
                } else {
                    Ok(WriteOutcome::Ignored)
                }
            }
        }
    }
}
