use serde_json::{Map, Value};
use thingest_types::{DeviceProvisioningRecord, RawMeasurement, topic::TopicMode};

use crate::{DecodeError, Module};

/// Decode a payload into an ordered sequence of raw measurements.
///
/// In [TopicMode::Multi] the payload is a flat mapping of raw keys to
/// scalar values, iterated in declared order; entries whose key names a
/// module the device declares are expanded through that module's codec.
/// In [TopicMode::Single] the whole payload is the named attribute's raw
/// value, run through the attribute's module codec when one applies.
///
/// Decoding never partially succeeds: any structural failure discards the
/// whole message's measurement content.
pub fn decode_payload(
    payload: &str,
    mode: &TopicMode,
    record: &DeviceProvisioningRecord,
) -> Result<Vec<RawMeasurement>, DecodeError> {
    match mode {
        TopicMode::Multi => decode_multi(payload, record),
        TopicMode::Single(attribute) => decode_single(payload, attribute, record),
    }
}

fn module_for(record: &DeviceProvisioningRecord, raw_key: &str) -> Option<Module> {
    if !record.declares_module(raw_key) {
        return None;
    }
    Module::from_key(raw_key)
}

fn decode_multi(
    payload: &str,
    record: &DeviceProvisioningRecord,
) -> Result<Vec<RawMeasurement>, DecodeError> {
    let object: Map<String, Value> =
        serde_json::from_str(payload).map_err(|_| DecodeError::PayloadSyntax)?;

    let mut out = Vec::with_capacity(object.len());
    for (raw_key, value) in object {
        let raw_value = scalar_to_string(&value)?;
        match module_for(record, &raw_key) {
            Some(module) => out.extend(module.decode(&raw_value)?),
            None => out.push(RawMeasurement::new(raw_key, raw_value)),
        }
    }
    Ok(out)
}

fn decode_single(
    payload: &str,
    attribute: &str,
    record: &DeviceProvisioningRecord,
) -> Result<Vec<RawMeasurement>, DecodeError> {
    match module_for(record, attribute) {
        Some(module) => module.decode(payload),
        None => Ok(vec![RawMeasurement::new(attribute, payload)]),
    }
}

fn scalar_to_string(value: &Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(DecodeError::PayloadSyntax),
    }
}
