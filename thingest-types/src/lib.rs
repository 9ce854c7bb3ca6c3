//! Part of [thingest], a library for ingesting and normalizing device
//! measures published over a lightweight publish/subscribe transport.
//!
//! This crate defines the shared data model: the inbound topic grammar,
//! provisioning records, raw and decoded measurements, update batches and
//! the compact device timestamp format.

pub mod constants;

pub mod topic;

mod provision;
mod update;
mod value;

pub mod timestamp;
pub mod utils;

pub use provision::*;
pub use update::*;
pub use value::*;

/// A measurement field exactly as it appears in an undecoded payload,
/// before alias resolution. Produced transiently per decoded token or
/// field and never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMeasurement {
    pub raw_key: String,
    pub raw_value: String,
}

impl RawMeasurement {
    pub fn new<K: Into<String>, V: Into<String>>(raw_key: K, raw_value: V) -> Self {
        Self {
            raw_key: raw_key.into(),
            raw_value: raw_value.into(),
        }
    }
}
