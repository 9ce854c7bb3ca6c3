use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thingest_types::{DeviceProvisioningRecord, ProvisionError};

use crate::{LookupError, ProvisioningStore};

/// An in-process [ProvisioningStore] backed by a HashMap.
///
/// Suitable for deployments that provision devices at startup and for
/// tests; production deployments usually implement [ProvisioningStore]
/// against their own registry service.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<(String, String), DeviceProvisioningRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a device record. The record is validated first.
    pub fn provision(&self, record: DeviceProvisioningRecord) -> Result<(), ProvisionError> {
        record.validate()?;
        let key = (record.apikey.clone(), record.device_id.clone());
        self.records.write().unwrap().insert(key, record);
        Ok(())
    }

    /// Remove a device record, returning it when present.
    pub fn remove(&self, apikey: &str, device_id: &str) -> Option<DeviceProvisioningRecord> {
        self.records
            .write()
            .unwrap()
            .remove(&(apikey.to_string(), device_id.to_string()))
    }
}

#[async_trait]
impl ProvisioningStore for MemoryStore {
    async fn lookup(
        &self,
        apikey: &str,
        device_id: &str,
    ) -> Result<DeviceProvisioningRecord, LookupError> {
        self.records
            .read()
            .unwrap()
            .get(&(apikey.to_string(), device_id.to_string()))
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                apikey: apikey.to_string(),
                device_id: device_id.to_string(),
            })
    }
}
