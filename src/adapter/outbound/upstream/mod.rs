//! Upstream trading-data API adapter.

pub mod client;
pub mod retry;
pub mod settings;

pub use client::UpstreamClient;
pub use retry::RetryPolicy;
pub use settings::UpstreamConfig;
