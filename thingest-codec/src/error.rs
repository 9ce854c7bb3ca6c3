use thiserror::Error;

/// Structural decode failures. Any of these discards the entire message's
/// measurement content; decoding never partially succeeds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("payload was not a flat mapping of raw keys to scalar values")]
    PayloadSyntax,
    #[error("module {module} has no variant with {count} fields")]
    UnknownVariant { module: &'static str, count: usize },
    #[error("module {module} expected {expected} hex digits, got {actual}")]
    LengthMismatch {
        module: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("module {module} payload {payload:?} contains a non hex digit")]
    InvalidHexDigit {
        module: &'static str,
        payload: String,
    },
}
