//! Logging configuration and initialization.

use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Logs go to
    /// stderr so command output on stdout stays machine-readable. Returns
    /// `false` when a subscriber was already installed; that one is kept.
    pub fn init(&self) -> bool {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let installed = match self.format.as_str() {
            "json" => fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init(),
            _ => fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init(),
        };

        match installed {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, format = %self.format, "Keeping existing tracing subscriber");
                false
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
