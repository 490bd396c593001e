#![allow(dead_code)]

pub mod server;

use std::path::PathBuf;
use std::sync::Arc;

use arena_sync::adapter::outbound::sqlite::SqliteSink;
use arena_sync::application::sync::{JobSchedule, Orchestrator, SinkWriter};
use arena_sync::port::{Sink, UpstreamSource};
use tempfile::TempDir;

/// SQLite database in a temporary directory, removed on drop.
pub struct TempDb {
    sink: Arc<SqliteSink>,
    path: PathBuf,
    _dir: TempDir,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("arena-sync.db");
        let sink = SqliteSink::open(path.to_str().expect("utf-8 temp path")).expect("open sqlite");
        Self {
            sink: Arc::new(sink),
            path,
            _dir: dir,
        }
    }

    pub fn sink(&self) -> Arc<SqliteSink> {
        Arc::clone(&self.sink)
    }

    pub fn path(&self) -> &str {
        self.path.to_str().expect("utf-8 temp path")
    }
}

/// Orchestrator backed by `db` for the directory, ledger and primary sink.
pub fn sqlite_orchestrator(
    db: &TempDb,
    upstream: Arc<dyn UpstreamSource>,
    extra_sinks: Vec<Arc<dyn Sink>>,
) -> Orchestrator<SqliteSink> {
    let sqlite = db.sink();
    let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(1 + extra_sinks.len());
    sinks.push(sqlite.clone());
    sinks.extend(extra_sinks);

    Orchestrator::new(
        upstream,
        SinkWriter::new(sinks),
        sqlite.clone(),
        sqlite,
        JobSchedule::default(),
    )
}
