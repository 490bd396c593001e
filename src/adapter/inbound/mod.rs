//! Inbound adapters (driving side): the HTTP trigger and the CLI.

pub mod cli;
pub mod http;
