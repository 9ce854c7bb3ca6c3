use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    #[error("timestamp alias must not be empty or contain topic wildcards: {0}")]
    InvalidTimestampAlias(String),
    #[error("worker capacity must be greater than zero")]
    ZeroWorkerCapacity,
}
