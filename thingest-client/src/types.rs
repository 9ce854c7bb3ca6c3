use thingest_types::topic::{MeasureTopic, TopicError};
use thiserror::Error;

/// Error types for inbound message validation.
#[derive(Error, Debug, PartialEq)]
pub enum MessageError {
    #[error("invalid measure topic: {0}")]
    Topic(#[from] TopicError),
    #[error("payload was not valid utf8")]
    PayloadUtf8,
}

/// One measure publication: the parsed topic and the opaque payload whose
/// structure the device's declared module/format determines.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureMessage {
    pub topic: MeasureTopic,
    pub payload: String,
}

/// An enum that represents the different types of events an
/// [EventLoop](crate::EventLoop) implementation can produce.
#[derive(Debug, PartialEq)]
pub enum Event {
    Offline,
    Online,
    Measure(MeasureMessage),
    InvalidPublish {
        reason: MessageError,
        topic: Vec<u8>,
        payload: Vec<u8>,
    },
}

/// Provisioning lookup failure.
#[derive(Error, Debug, PartialEq)]
pub enum LookupError {
    #[error("no device provisioned for apikey {apikey} device {device_id}")]
    NotFound { apikey: String, device_id: String },
}

/// Downstream delivery failure. The core treats delivery as at-most-once
/// per batch and never retries; rejections surface unchanged.
#[derive(Error, Debug, PartialEq)]
pub enum DeliveryError {
    #[error("update batch rejected downstream: {0}")]
    Rejected(String),
}
