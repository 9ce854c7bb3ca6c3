use std::str::Utf8Error;

use thiserror::Error;

use crate::constants::ATTRS;

#[derive(Error, Debug, PartialEq)]
pub enum TopicError {
    #[error("measure topic was malformed")]
    Malformed,
    #[error("topic utf8 decode error: {0}")]
    Utf8(#[from] Utf8Error),
}

/// Whether a measure message carries the device's full attribute set or
/// the raw value of a single named attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum TopicMode {
    /// No trailing attribute segment, the payload encodes all attributes.
    Multi,
    /// Trailing attribute segment, the payload is one attribute's raw value.
    Single(String),
}

/// A parsed inbound measure topic of the form
/// `<apikey>/<deviceId>/attrs[/<attributeName>]`.
///
/// A single leading `/` is tolerated since field devices commonly publish
/// to `/1234/MQTT_2/attrs`.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasureTopic {
    pub apikey: String,
    pub device_id: String,
    pub mode: TopicMode,
}

impl MeasureTopic {
    pub fn parse(topic: &[u8]) -> Result<Self, TopicError> {
        Self::parse_str(std::str::from_utf8(topic)?)
    }

    pub fn parse_str(topic: &str) -> Result<Self, TopicError> {
        let topic = topic.strip_prefix('/').unwrap_or(topic);
        let mut iter = topic.split('/');

        let apikey = match iter.next() {
            Some(val) if !val.is_empty() => val,
            _ => return Err(TopicError::Malformed),
        };

        let device_id = match iter.next() {
            Some(val) if !val.is_empty() => val,
            _ => return Err(TopicError::Malformed),
        };

        match iter.next() {
            Some(val) if val == ATTRS => (),
            _ => return Err(TopicError::Malformed),
        };

        let mode = match iter.next() {
            Some(attribute) if !attribute.is_empty() => TopicMode::Single(attribute.to_string()),
            Some(_) => return Err(TopicError::Malformed),
            None => TopicMode::Multi,
        };

        if iter.next().is_some() {
            return Err(TopicError::Malformed);
        }

        Ok(Self {
            apikey: apikey.to_string(),
            device_id: device_id.to_string(),
            mode,
        })
    }
}
