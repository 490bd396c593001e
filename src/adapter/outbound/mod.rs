//! Outbound adapters (driven side).

pub mod edge;
pub mod sqlite;
pub mod upstream;
