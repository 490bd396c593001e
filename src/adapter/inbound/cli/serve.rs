//! Handler for the `serve` command: HTTP trigger plus a fixed-interval tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::adapter::inbound::cli::command::ServeArgs;
use crate::adapter::inbound::http::{self, TriggerState};
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap::{build_service, SyncService};
use crate::infrastructure::config::settings::Config;
use crate::port::{SyncRequest, SyncTrigger};

/// Run due categories every `tick` until `shutdown` flips.
async fn tick_loop(service: Arc<SyncService>, tick: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match service.run(SyncRequest::all()).await {
                    Ok(summary) => info!(
                        synced = summary.totals.synced,
                        categories_failed = summary.totals.categories_failed,
                        "Scheduled sync finished"
                    ),
                    Err(e) => error!(error = %e, "Scheduled sync could not start"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Execute the serve command.
pub async fn execute(config: &Config, args: &ServeArgs) -> Result<()> {
    let bind = args.bind.as_deref().unwrap_or(&config.server.bind);
    let addr = bind.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
        field: "server.bind",
        reason: e.to_string(),
    })?;

    let service = build_service(config).await?;
    if config.secrets.sync_secret.is_none() {
        warn!("SYNC_SECRET is not set; trigger requests will be refused");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ticker = (!args.no_schedule).then(|| {
        tokio::spawn(tick_loop(
            Arc::clone(&service),
            config.schedule.tick(),
            shutdown_rx.clone(),
        ))
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        let _ = shutdown_tx.send(true);
    });

    let state = TriggerState::new(service, config.secrets.sync_secret.clone());
    let mut server_shutdown = shutdown_rx;
    http::serve(addr, state, async move {
        let _ = server_shutdown.changed().await;
    })
    .await?;

    if let Some(ticker) = ticker {
        let _ = ticker.await;
    }
    info!("arena-sync stopped");
    Ok(())
}
