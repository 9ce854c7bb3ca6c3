//! Part of [thingest], a library for ingesting and normalizing device
//! measures published over a lightweight publish/subscribe transport.
//!
//! This crate is the pipeline: it polls an inbound
//! [EventLoop](thingest_client::EventLoop), decodes each payload through
//! the module codecs, resolves raw keys to canonical attributes via the
//! device's provisioning record, extracts the embedded device timestamp
//! and hands one normalized [UpdateBatch](thingest_types::UpdateBatch)
//! per message to the delivery collaborator, preserving per-device
//! arrival order.

mod agent;
mod assemble;
mod builder;
mod diagnostics;
mod error;
mod extract;
mod resolve;

pub use agent::Agent;
pub use assemble::assemble;
pub use builder::AgentBuilder;
pub use diagnostics::Diagnostic;
pub use error::BuildError;
pub use extract::{extract_timestamp, Extraction};
pub use resolve::{resolve, Resolution};
