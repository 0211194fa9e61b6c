use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaskError {
    #[error("value not found in s3 bucket: {0}")]
    NotFound(String),

    #[error("key does not match value: expected {expected}, actual {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("object store error: {0}")]
    Transport(#[from] object_store::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaskError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CaskError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CaskError>;
