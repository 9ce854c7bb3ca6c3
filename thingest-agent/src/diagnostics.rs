use log::{debug, error, warn};
use thingest_codec::DecodeError;

/// Structured, operator-facing events produced by the pipeline.
///
/// Diagnostics are for logging, not for the caller's control flow: none
/// of them crash the ingesting process, and a fault in one message never
/// affects processing of the next.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    MalformedTopic {
        topic: String,
        detail: String,
    },
    Decode {
        device_id: String,
        error: DecodeError,
    },
    DeviceNotFound {
        apikey: String,
        device_id: String,
    },
    UnmappedAttribute {
        device_id: String,
        raw_key: String,
    },
    TypeMismatch {
        device_id: String,
        raw_key: String,
        attr_type: String,
        raw_value: String,
    },
    InvalidTimestamp {
        device_id: String,
        raw_value: String,
    },
    DeliveryRejected {
        device_id: String,
        reason: String,
    },
}

impl Diagnostic {
    pub fn report(&self) {
        match self {
            Diagnostic::MalformedTopic { topic, detail } => {
                warn!("Discarding publication with malformed topic. topic={topic} detail={detail}")
            }
            Diagnostic::Decode { device_id, error } => {
                warn!("Discarding undecodable measure payload. device={device_id} error={error}")
            }
            Diagnostic::DeviceNotFound { apikey, device_id } => {
                warn!("Measure for unprovisioned device. apikey={apikey} device={device_id}")
            }
            Diagnostic::UnmappedAttribute { device_id, raw_key } => {
                debug!("Dropping unmapped raw key. device={device_id} key={raw_key}")
            }
            Diagnostic::TypeMismatch {
                device_id,
                raw_key,
                attr_type,
                raw_value,
            } => warn!(
                "Dropping attribute with non {attr_type} value. device={device_id} key={raw_key} value={raw_value}"
            ),
            Diagnostic::InvalidTimestamp {
                device_id,
                raw_value,
            } => warn!(
                "Ignoring unparseable device timestamp. device={device_id} value={raw_value}"
            ),
            Diagnostic::DeliveryRejected { device_id, reason } => {
                error!("Update batch rejected downstream. device={device_id} reason={reason}")
            }
        }
    }
}
