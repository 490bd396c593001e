//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`sink`]: In-memory [`Sink`](crate::port::Sink) with failure injection.
//! - [`upstream`]: Scripted [`UpstreamSource`](crate::port::UpstreamSource).
//! - [`ledger`]: In-memory [`JobLedger`](crate::port::JobLedger).
//! - [`directory`]: Fixed [`AgentDirectory`](crate::port::AgentDirectory).
//! - [`payloads`]: Canonical upstream payloads for each category.

pub mod directory;
pub mod ledger;
pub mod payloads;
pub mod sink;
pub mod upstream;
