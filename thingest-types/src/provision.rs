use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::validate_name;

#[derive(Error, Debug, PartialEq)]
pub enum ProvisionError {
    #[error("invalid provisioning record: {0}")]
    InvalidName(String),
    #[error("raw key {0} is declared more than once")]
    DuplicateRawKey(String),
}

/// One declared mapping from a payload raw key to the canonical attribute
/// name and type registered downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeMapping {
    pub raw_key: String,
    pub canonical_name: String,
    pub attr_type: String,
}

impl AttributeMapping {
    pub fn new<K, N, T>(raw_key: K, canonical_name: N, attr_type: T) -> Self
    where
        K: Into<String>,
        N: Into<String>,
        T: Into<String>,
    {
        Self {
            raw_key: raw_key.into(),
            canonical_name: canonical_name.into(),
            attr_type: attr_type.into(),
        }
    }
}

/// A device's provisioning record: identity, delivery scope, declared
/// attribute mappings and the module formats the device reports with.
///
/// Owned by the external registry and read-only to the ingestion core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceProvisioningRecord {
    pub device_id: String,
    pub apikey: String,
    pub service: String,
    pub service_path: String,
    pub attributes: Vec<AttributeMapping>,
    #[serde(default)]
    pub modules: Vec<String>,
}

impl DeviceProvisioningRecord {
    /// Look up the mapping for a raw key, exact and case-sensitive.
    pub fn mapping_for(&self, raw_key: &str) -> Option<&AttributeMapping> {
        self.attributes.iter().find(|m| m.raw_key == raw_key)
    }

    /// Whether the device declares the given module format in use.
    pub fn declares_module(&self, module_id: &str) -> bool {
        self.modules.iter().any(|m| m == module_id)
    }

    /// Check the record invariants: non-empty identifiers and raw keys
    /// unique within the mapping list.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        validate_name(&self.device_id).map_err(ProvisionError::InvalidName)?;
        validate_name(&self.apikey).map_err(ProvisionError::InvalidName)?;
        for (i, mapping) in self.attributes.iter().enumerate() {
            validate_name(&mapping.raw_key).map_err(ProvisionError::InvalidName)?;
            validate_name(&mapping.canonical_name).map_err(ProvisionError::InvalidName)?;
            if self.attributes[..i]
                .iter()
                .any(|m| m.raw_key == mapping.raw_key)
            {
                return Err(ProvisionError::DuplicateRawKey(mapping.raw_key.clone()));
            }
        }
        Ok(())
    }
}
