//! Arena Sync - idempotent synchronization of AI trading-competition data.
//!
//! Pulls leaderboard, trade, analytics, conversation, account, inception and
//! price payloads from the upstream competition API, maps upstream model
//! names onto canonical agent ids, and writes normalized records into a
//! relational store and an optional edge-cache mirror.
//!
//! # Architecture
//!
//! The crate is laid out hexagonally:
//!
//! - [`domain`] - Records, identifiers and sync reports; no I/O
//! - [`port`] - Traits the application depends on (sinks, upstream, ledger)
//! - [`application`] - Reconciler, transformer, sink writer, pipelines and
//!   the orchestrator
//! - [`adapter`] - Upstream HTTP client, SQLite and edge sinks, HTTP trigger
//!   and CLI
//! - [`infrastructure`] - Configuration and the composition root
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use arena_sync::infrastructure::bootstrap::build_service;
//! use arena_sync::infrastructure::config::settings::Config;
//! use arena_sync::port::{SyncRequest, SyncTrigger};
//!
//! # async fn demo() -> arena_sync::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let service = build_service(&config).await?;
//! let summary = service.run(SyncRequest::all()).await?;
//! println!("{} records synced", summary.totals.synced);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
