use chrono::NaiveDateTime;
use thiserror::Error;

use crate::constants::COMPACT_TIMESTAMP_FORMAT;

#[derive(Error, Debug, PartialEq)]
#[error("invalid compact timestamp {raw}: {source}")]
pub struct TimestampError {
    pub raw: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Parse a device-local compact timestamp (`YYYYMMDDThhmmss`) into a
/// canonical instant.
pub fn parse_compact_timestamp(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    NaiveDateTime::parse_from_str(raw, COMPACT_TIMESTAMP_FORMAT).map_err(|source| {
        TimestampError {
            raw: raw.to_string(),
            source,
        }
    })
}
