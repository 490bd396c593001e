use thiserror::Error;

use crate::domain::id::Category;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failure of a single HTTP attempt against the upstream API.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid JSON body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Synchronization failures, from a single record up to a whole trigger.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("upstream unavailable at {url} after {attempts} attempts: {last}")]
    UpstreamUnavailable {
        url: String,
        attempts: u32,
        #[source]
        last: FetchError,
    },

    #[error("malformed {category} record: {reason}")]
    MalformedRecord { category: Category, reason: String },

    #[error("no canonical agent for upstream id '{upstream_id}'")]
    UnmappedIdentifier { upstream_id: String },

    #[error("{sink} write failed for {key}: {reason}")]
    SinkWrite {
        sink: &'static str,
        key: String,
        reason: String,
    },

    #[error("unauthorized")]
    Unauthorized,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("edge cache error: {0}")]
    Edge(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(err.to_string())
    }
}
