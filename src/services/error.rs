use thiserror::Error;

use crate::application::error::UploadError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidKey(String),

    #[error("Storage configuration error: {0}")]
    ConfigError(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}

impl From<StorageError> for UploadError {
    fn from(error: StorageError) -> Self {
        UploadError::StorageWriteFailure(error.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        StorageError::WriteFailed(error.to_string())
    }
}
