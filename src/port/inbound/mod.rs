//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`sync`]: run a sync cycle and read the job ledger

pub mod sync;
