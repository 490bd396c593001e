use anyhow::Context;
use arena_sync::adapter::inbound::cli::{self, command::Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    cli::execute(args).await.context("arena-sync failed")
}
