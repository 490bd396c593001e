//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!          HTTP trigger / CLI
//!                 │  SyncTrigger
//!                 ▼
//!        ┌──────────────────┐
//!        │   Application    │
//!        │ (sync pipelines) │
//!        └──────────────────┘
//!      │          │           │
//!      ▼          ▼           ▼
//!  Upstream     Sink      JobLedger /
//!   Source   (primary,   AgentDirectory
//!             mirror)
//! ```

pub mod inbound;
pub mod outbound;

pub use inbound::sync::{SyncRequest, SyncTrigger};
pub use outbound::sink::{Sink, SinkRole};
pub use outbound::store::{AgentDirectory, JobLedger};
pub use outbound::upstream::UpstreamSource;
