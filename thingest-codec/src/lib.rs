//! Part of [thingest], a library for ingesting and normalizing device
//! measures published over a lightweight publish/subscribe transport.
//!
//! This crate holds the module codec registry and the payload decoder.
//! Both are pure functions over their inputs: decoding shares no state
//! between messages, so payloads for unrelated devices can be decoded
//! fully in parallel.

mod decoder;
mod error;
mod module;

pub use decoder::decode_payload;
pub use error::DecodeError;
pub use module::Module;
