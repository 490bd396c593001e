//! CLI module graph.

pub mod command;
pub mod serve;
pub mod sync;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use command::{Cli, Commands};

/// Load configuration for `cli`, applying command-line overrides.
///
/// # Errors
/// Returns an error if the configuration file cannot be read or is invalid.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::parse_toml("")?,
    };
    if let Some(database) = &cli.database {
        config.database.clone_from(database);
    }
    config.validate()?;
    Ok(config)
}

/// Dispatch a parsed command.
///
/// # Errors
/// Propagates the command's failure.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    config.init_logging();

    match &cli.command {
        Commands::Serve(args) => serve::execute(&config, args).await,
        Commands::Sync(args) => sync::execute_sync(&config, args).await,
        Commands::Status => sync::execute_status(&config).await,
    }
}
