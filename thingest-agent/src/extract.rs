use thingest_types::{timestamp::parse_compact_timestamp, MeasurementMetadata, RawMeasurement};

use crate::Diagnostic;

/// The outcome of timestamp extraction: the remaining measurements with
/// the reserved key removed, and the metadata when one parsed.
#[derive(Debug)]
pub struct Extraction {
    pub measures: Vec<RawMeasurement>,
    pub metadata: Option<MeasurementMetadata>,
    pub diagnostic: Option<Diagnostic>,
}

/// Pull the reserved timestamp raw key out of the measurement list.
///
/// The reserved key is always excluded from the ordinary attributes,
/// whether or not its value parses. An unparseable value is non-fatal:
/// the batch proceeds without metadata and the delivery collaborator
/// applies its own arrival-time default. Sibling measurements are never
/// altered.
pub fn extract_timestamp(
    device_id: &str,
    reserved_key: &str,
    measures: Vec<RawMeasurement>,
) -> Extraction {
    let mut remaining = Vec::with_capacity(measures.len());
    let mut reserved = None;

    for measure in measures {
        if measure.raw_key == reserved_key && reserved.is_none() {
            reserved = Some(measure.raw_value);
        } else if measure.raw_key == reserved_key {
            /* Duplicate reserved keys carry no extra information */
        } else {
            remaining.push(measure);
        }
    }

    let (metadata, diagnostic) = match reserved {
        None => (None, None),
        Some(raw_value) => match parse_compact_timestamp(&raw_value) {
            Ok(timestamp) => (Some(MeasurementMetadata { timestamp }), None),
            Err(_) => (
                None,
                Some(Diagnostic::InvalidTimestamp {
                    device_id: device_id.to_string(),
                    raw_value,
                }),
            ),
        },
    };

    Extraction {
        measures: remaining,
        metadata,
        diagnostic,
    }
}
