//! Edge cache adapter: a D1-style SQL-over-HTTP database used as a
//! low-latency mirror of the relational sink.

pub mod client;
pub mod settings;
pub mod sink;

pub use client::{EdgeClient, Statement};
pub use settings::EdgeConfig;
pub use sink::EdgeSink;
