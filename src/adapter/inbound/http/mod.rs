//! HTTP trigger adapter.
//!
//! `GET|POST /api/sync` runs a sync, `GET /api/sync/status` shows the job
//! ledger; both require `Authorization: Bearer <secret>`. `GET /health` is
//! open.

pub mod auth;
pub mod routes;
pub mod server;

pub use routes::{router, TriggerState};
pub use server::serve;
