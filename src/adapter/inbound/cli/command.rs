//! Command-line interface definitions.
//!
//! Defines the CLI structure for arena-sync using `clap`: a long-running
//! `serve` mode and one-shot `sync` and `status` commands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Category;
use crate::port::SyncRequest;

/// Trading-competition data synchronizer
#[derive(Parser, Debug)]
#[command(name = "arena-sync")]
#[command(version)]
pub struct Cli {
    /// Configuration file; built-in defaults apply when omitted
    #[arg(short, long, global = true, env = "ARENA_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path, overriding the configuration file
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP trigger and run scheduled syncs until Ctrl-C
    Serve(ServeArgs),

    /// Run one sync cycle and print the summary as JSON
    Sync(SyncArgs),

    /// Print the last run of each category as JSON
    Status,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address, overriding `[server] bind`
    #[arg(long)]
    pub bind: Option<String>,

    /// Only serve the trigger; do not run the tick loop
    #[arg(long)]
    pub no_schedule: bool,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Category to sync (repeatable); all categories when omitted
    #[arg(long = "category", short = 'C', value_parser = parse_category)]
    pub categories: Vec<Category>,

    /// Ignore the schedule and run every requested category
    #[arg(long)]
    pub force: bool,
}

impl SyncArgs {
    #[must_use]
    pub fn request(&self) -> SyncRequest {
        SyncRequest {
            categories: self.categories.clone(),
            force: self.force,
        }
    }
}

fn parse_category(raw: &str) -> Result<Category, String> {
    raw.parse()
}
