use chrono::NaiveDateTime;
use serde::Serialize;

use crate::AttributeValue;

/// A measurement resolved to its canonical name and type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecodedAttribute {
    pub name: String,
    pub attr_type: String,
    pub value: AttributeValue,
}

impl DecodedAttribute {
    pub fn new<N: Into<String>, T: Into<String>>(
        name: N,
        attr_type: T,
        value: AttributeValue,
    ) -> Self {
        Self {
            name: name.into(),
            attr_type: attr_type.into(),
            value,
        }
    }
}

/// Metadata for a whole batch. One device message carries one observation
/// instant for all of its attributes, so the timestamp attaches here and
/// not to an individual attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeasurementMetadata {
    pub timestamp: NaiveDateTime,
}

/// One normalized set of attribute updates for a single logical entity.
///
/// Created per inbound message, handed once to the delivery collaborator
/// and then discarded. The delivery scope comes from the provisioning
/// record, never from the transport message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateBatch {
    pub device_id: String,
    pub service: String,
    pub service_path: String,
    pub attributes: Vec<DecodedAttribute>,
    pub metadata: Option<MeasurementMetadata>,
}
