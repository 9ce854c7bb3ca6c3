use thingest_types::{AttributeValue, DecodedAttribute, DeviceProvisioningRecord, RawMeasurement};

use crate::Diagnostic;

/// The outcome of alias resolution: the attributes that resolved, plus
/// the diagnostics for everything that was dropped along the way.
#[derive(Debug)]
pub struct Resolution {
    pub attributes: Vec<DecodedAttribute>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve raw measurements against the device's declared attribute
/// mappings.
///
/// Unmapped raw keys and per-field type mismatches are localized: the
/// offending field is dropped with a diagnostic and its siblings proceed.
pub fn resolve(record: &DeviceProvisioningRecord, measures: Vec<RawMeasurement>) -> Resolution {
    let mut attributes = Vec::with_capacity(measures.len());
    let mut diagnostics = Vec::new();

    for measure in measures {
        let mapping = match record.mapping_for(&measure.raw_key) {
            Some(mapping) => mapping,
            None => {
                diagnostics.push(Diagnostic::UnmappedAttribute {
                    device_id: record.device_id.clone(),
                    raw_key: measure.raw_key,
                });
                continue;
            }
        };

        match AttributeValue::parse(&measure.raw_value, &mapping.attr_type) {
            Ok(value) => attributes.push(DecodedAttribute::new(
                mapping.canonical_name.clone(),
                mapping.attr_type.clone(),
                value,
            )),
            Err(_) => diagnostics.push(Diagnostic::TypeMismatch {
                device_id: record.device_id.clone(),
                raw_key: measure.raw_key,
                attr_type: mapping.attr_type.clone(),
                raw_value: measure.raw_value,
            }),
        }
    }

    Resolution {
        attributes,
        diagnostics,
    }
}
