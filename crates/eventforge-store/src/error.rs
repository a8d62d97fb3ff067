use thiserror::Error;

/// Errors raised by store implementations and the publisher.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not connect after {attempts} attempts: {last_error}")]
    ConnectionExhausted { attempts: u32, last_error: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unknown table '{0}'")]
    UnknownTable(String),
    #[error("unknown column '{column}' in '{table}'")]
    UnknownColumn { table: String, column: String },
    #[error("no row in '{table}' with {key_column} = {key}")]
    UnknownRow {
        table: String,
        key_column: String,
        key: i64,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
