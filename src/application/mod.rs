//! Application services (use cases).
//!
//! These services coordinate the domain types and the ports to implement
//! the application's use cases.

pub mod sync;
