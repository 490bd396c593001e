//! The synchronization use case.
//!
//! ```text
//! Orchestrator ── per category, concurrently ──▶ Pipeline
//!                                                 │ fetch      (UpstreamSource)
//!                                                 │ reconcile  (Reconciler)
//!                                                 │ transform  (transform::*)
//!                                                 ▼ write      (SinkWriter ▶ Sink*)
//! ```

pub mod orchestrator;
pub mod pipeline;
pub mod reconcile;
pub mod schedule;
pub mod transform;
pub mod writer;

pub use orchestrator::Orchestrator;
pub use reconcile::Reconciler;
pub use schedule::JobSchedule;
pub use writer::SinkWriter;
