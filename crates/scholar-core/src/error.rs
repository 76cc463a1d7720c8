use thiserror::Error;

/// Failure kinds surfaced to callers of the recommendation pipeline.
///
/// A field-extraction rule that does not match is never an error; the field
/// simply keeps its default.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service not ready: {0}")]
    NotReady(String),

    #[error("Error processing request: {0}")]
    Downstream(String),
}

impl Error {
    pub fn downstream(err: impl std::fmt::Display) -> Self {
        Self::Downstream(err.to_string())
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
