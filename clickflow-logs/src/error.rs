use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error reading csv record: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Line {line}: expected 3 fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("Line {line}: error parsing time '{value}': {source}")]
    InvalidTimestamp {
        line: u64,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Line {line}: timestamp '{value}' is out of range")]
    TimestampOutOfRange { line: u64, value: String },

    #[error("Line {line}: screen name '{name}' is reserved for session markers")]
    ReservedScreen { line: u64, name: String },
}

pub type Result<T> = std::result::Result<T, LogError>;
