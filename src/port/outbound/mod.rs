//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the upstream API, the sinks, and the relational
//! store's agent list and job ledger.

pub mod sink;
pub mod store;
pub mod upstream;
