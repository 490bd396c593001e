//! SQLite persistence adapter: the relational sink, agent directory and
//! job ledger, using Diesel ORM.

pub mod database;
pub mod sink;

pub use sink::SqliteSink;
