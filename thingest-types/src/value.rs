use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValueError {
    #[error("value {raw_value:?} is not numeric for declared type {attr_type}")]
    NotNumeric {
        attr_type: String,
        raw_value: String,
    },
}

/// The normalized value of a decoded attribute.
///
/// Devices report everything as strings; the declared attribute type in
/// the provisioning record decides whether a value is converted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

fn is_numeric_type(attr_type: &str) -> bool {
    matches!(
        attr_type,
        "Number" | "number" | "Integer" | "integer" | "Float" | "float"
    )
}

impl AttributeValue {
    /// Parse a raw string per the declared attribute type. Numeric types
    /// attempt numeric conversion, all other types pass through unchanged.
    pub fn parse(raw_value: &str, attr_type: &str) -> Result<Self, ValueError> {
        if !is_numeric_type(attr_type) {
            return Ok(AttributeValue::Text(raw_value.to_string()));
        }
        match raw_value.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(AttributeValue::Number(number)),
            _ => Err(ValueError::NotNumeric {
                attr_type: attr_type.to_string(),
                raw_value: raw_value.to_string(),
            }),
        }
    }
}
