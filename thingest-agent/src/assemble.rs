use thingest_types::{
    DecodedAttribute, DeviceProvisioningRecord, MeasurementMetadata, UpdateBatch,
};

/// Build the normalized update batch for one inbound message.
///
/// The delivery scope (service and service-path) comes from the device's
/// provisioning record, never from the transport message.
pub fn assemble(
    record: &DeviceProvisioningRecord,
    attributes: Vec<DecodedAttribute>,
    metadata: Option<MeasurementMetadata>,
) -> UpdateBatch {
    UpdateBatch {
        device_id: record.device_id.clone(),
        service: record.service.clone(),
        service_path: record.service_path.clone(),
        attributes,
        metadata,
    }
}
