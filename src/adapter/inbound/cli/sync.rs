//! Handlers for the one-shot `sync` and `status` commands.

use crate::adapter::inbound::cli::command::SyncArgs;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_service;
use crate::infrastructure::config::settings::Config;
use crate::port::SyncTrigger;

/// Run one cycle and print the summary.
pub async fn execute_sync(config: &Config, args: &SyncArgs) -> Result<()> {
    let service = build_service(config).await?;
    let summary = service.run(args.request()).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print the job ledger.
pub async fn execute_status(config: &Config) -> Result<()> {
    let service = build_service(config).await?;
    let runs = service.status().await?;
    println!("{}", serde_json::to_string_pretty(&runs)?);
    Ok(())
}
