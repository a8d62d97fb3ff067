use thiserror::Error;

/// Core error type shared across eventforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The generation policy cannot be satisfied as configured.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by eventforge crates.
pub type Result<T> = std::result::Result<T, Error>;
