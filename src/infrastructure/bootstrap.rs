//! Composition root: builds the orchestrator and its adapters from config.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::edge::{EdgeClient, EdgeSink};
use crate::adapter::outbound::sqlite::SqliteSink;
use crate::adapter::outbound::upstream::UpstreamClient;
use crate::application::sync::{Orchestrator, SinkWriter};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::{Config, EDGE_TOKEN_ENV};
use crate::port::{JobLedger, Sink, UpstreamSource};

/// The orchestrator as wired for production.
pub type SyncService = Orchestrator<SqliteSink>;

/// Build the edge mirror, if one is configured.
///
/// A schema failure is logged, not fatal: the mirror stays in place and its
/// write failures are tallied per record.
async fn build_edge_sink(config: &Config) -> Result<Option<Arc<EdgeSink>>> {
    let Some(edge) = &config.edge else {
        return Ok(None);
    };
    let token = config
        .secrets
        .edge_api_token
        .clone()
        .ok_or(ConfigError::MissingField {
            field: EDGE_TOKEN_ENV,
        })?;

    let sink = EdgeSink::new(EdgeClient::new(edge, token)?);
    if let Err(e) = sink.ensure_schema().await {
        warn!(error = %e, "Edge schema setup failed; mirror writes may fail");
    }
    Ok(Some(Arc::new(sink)))
}

/// Wire every adapter into a ready-to-run [`SyncService`].
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated, the
/// upstream client cannot be built, or the edge mirror is configured
/// without its token.
pub async fn build_service(config: &Config) -> Result<Arc<SyncService>> {
    let sqlite = Arc::new(SqliteSink::open(&config.database)?);
    info!(database = %config.database, "Relational sink ready");

    let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(2);
    sinks.push(sqlite.clone());
    if let Some(edge) = build_edge_sink(config).await? {
        info!("Edge mirror enabled");
        sinks.push(edge);
    }

    let upstream: Arc<dyn UpstreamSource> = Arc::new(UpstreamClient::from_config(&config.upstream)?);
    let ledger: Arc<dyn JobLedger> = sqlite.clone();

    Ok(Arc::new(Orchestrator::new(
        upstream,
        SinkWriter::new(sinks),
        sqlite,
        ledger,
        config.schedule.job_schedule(),
    )))
}
