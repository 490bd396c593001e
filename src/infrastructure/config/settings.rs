//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; secrets come from the environment
//! only (`SYNC_SECRET` or `CRON_SECRET`, and `EDGE_API_TOKEN`).
//!
//! # Example
//!
//! ```no_run
//! use arena_sync::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use super::schedule::ScheduleConfig;
use super::server::ServerConfig;
use crate::adapter::outbound::edge::EdgeConfig;
use crate::adapter::outbound::upstream::UpstreamConfig;
use crate::domain::Category;
use crate::error::{ConfigError, Result};

/// Environment variable holding the trigger bearer secret.
pub const SYNC_SECRET_ENV: &str = "SYNC_SECRET";
/// Fallback name used by cron-style deployments.
pub const CRON_SECRET_ENV: &str = "CRON_SECRET";
pub const EDGE_TOKEN_ENV: &str = "EDGE_API_TOKEN";

/// Values read from the environment, never from the file.
#[derive(Clone, Default)]
pub struct Secrets {
    pub sync_secret: Option<String>,
    pub edge_api_token: Option<String>,
}

impl Secrets {
    /// Read secrets from the process environment. Blank values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            sync_secret: var(SYNC_SECRET_ENV).or_else(|| var(CRON_SECRET_ENV)),
            edge_api_token: var(EDGE_TOKEN_ENV),
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("Secrets")
            .field("sync_secret", &mask(&self.sync_secret))
            .field("edge_api_token", &mask(&self.edge_api_token))
            .finish()
    }
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Upstream trading-data API.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Path to SQLite database file.
    ///
    /// Defaults to "arena-sync.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Edge cache mirror. Disabled when absent.
    #[serde(default)]
    pub edge: Option<EdgeConfig>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(skip)]
    pub secrets: Secrets,
}

fn default_database_path() -> String {
    "arena-sync.db".to_string()
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

fn check_url(field: &'static str, value: &str) -> std::result::Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    Ok(())
}

impl Config {
    /// Parse configuration from TOML content and read secrets from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.secrets = Secrets::from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] or [`ConfigError::InvalidValue`]
    /// for the first offending field.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let upstream = &self.upstream;
        check_url("upstream.base_url", &upstream.base_url)?;
        if upstream.timeout_ms == 0 {
            return Err(invalid("upstream.timeout_ms", "must be greater than 0").into());
        }
        if upstream.max_retries == 0 {
            return Err(invalid("upstream.max_retries", "must be greater than 0").into());
        }
        if upstream.max_backoff_ms < upstream.initial_backoff_ms {
            return Err(invalid("upstream.max_backoff_ms", "must be >= initial_backoff_ms").into());
        }
        if upstream.models.iter().any(|m| m.trim().is_empty()) {
            return Err(invalid("upstream.models", "model ids must not be empty").into());
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        if let Some(edge) = &self.edge {
            check_url("edge.api_url", &edge.api_url)?;
            if edge.account_id.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "edge.account_id",
                }
                .into());
            }
            if edge.database_id.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "edge.database_id",
                }
                .into());
            }
            if edge.timeout_ms == 0 {
                return Err(invalid("edge.timeout_ms", "must be greater than 0").into());
            }
        }

        self.server
            .socket_addr()
            .map_err(|e| invalid("server.bind", e.to_string()))?;

        if self.schedule.interval_secs == 0 {
            return Err(invalid("schedule.interval_secs", "must be greater than 0").into());
        }
        if let Some((category, _)) = self.schedule.intervals.iter().find(|(_, mins)| **mins == 0) {
            return Err(invalid(
                "schedule.intervals",
                format!("interval for {category} must be greater than 0"),
            )
            .into());
        }

        Ok(())
    }

    /// Minimum interval of `category`, in minutes.
    #[must_use]
    pub fn interval_mins(&self, category: Category) -> u64 {
        self.schedule.interval_mins(category)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
