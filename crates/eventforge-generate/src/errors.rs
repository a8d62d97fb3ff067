use thiserror::Error;

/// Errors emitted by the dataset generator and its file sinks.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
    #[error("invariant violated: {}", .0.join("; "))]
    InvariantViolation(Vec<String>),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Core(eventforge_core::Error),
}

impl From<eventforge_core::Error> for GenerationError {
    fn from(err: eventforge_core::Error) -> Self {
        match err {
            eventforge_core::Error::InvalidPolicy(message) => Self::InvalidPolicy(message),
            other => Self::Core(other),
        }
    }
}
