use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, ProcessingError>;
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upload rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] validator::ValidationErrors),

    #[error("Persistence failure: {0}")]
    Store(#[from] StoreError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot aggregate an empty batch")]
    EmptyBatch,

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// The validation failure behind this error, if the upload itself was rejected.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ProcessingError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Why an upload was rejected. Only the first offending line is ever reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("File name must not be empty")]
    MissingFileName,

    #[error("Line {line}: expected 3 ';'-separated fields, found {found}")]
    MalformedRow { line: usize, found: usize },

    #[error("Line {line}: date '{raw}' is unparsable or outside the accepted window")]
    InvalidDate { line: usize, raw: String },

    #[error("Line {line}: execution time '{raw}' is not a non-negative number")]
    InvalidExecutionTime { line: usize, raw: String },

    #[error("Line {line}: value '{raw}' is not a non-negative number")]
    InvalidValue { line: usize, raw: String },

    #[error("Batch contains {count} rows, expected between {min} and {max}")]
    BatchSizeOutOfRange { count: usize, min: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    MissingFileName,
    MalformedRow,
    InvalidDate,
    InvalidExecutionTime,
    InvalidValue,
    BatchSizeOutOfRange,
}

impl ValidationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            ValidationError::MissingFileName => ValidationKind::MissingFileName,
            ValidationError::MalformedRow { .. } => ValidationKind::MalformedRow,
            ValidationError::InvalidDate { .. } => ValidationKind::InvalidDate,
            ValidationError::InvalidExecutionTime { .. } => ValidationKind::InvalidExecutionTime,
            ValidationError::InvalidValue { .. } => ValidationKind::InvalidValue,
            ValidationError::BatchSizeOutOfRange { .. } => ValidationKind::BatchSizeOutOfRange,
        }
    }

    /// File line number (1-based, header included) the failure refers to.
    pub fn line(&self) -> Option<usize> {
        match self {
            ValidationError::MalformedRow { line, .. }
            | ValidationError::InvalidDate { line, .. }
            | ValidationError::InvalidExecutionTime { line, .. }
            | ValidationError::InvalidValue { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValidationKind::MissingFileName => "MissingFileName",
            ValidationKind::MalformedRow => "MalformedRow",
            ValidationKind::InvalidDate => "InvalidDate",
            ValidationKind::InvalidExecutionTime => "InvalidExecutionTime",
            ValidationKind::InvalidValue => "InvalidValue",
            ValidationKind::BatchSizeOutOfRange => "BatchSizeOutOfRange",
        };
        write!(f, "{}", name)
    }
}
