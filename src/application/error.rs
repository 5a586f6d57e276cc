use thiserror::Error;

#[derive(Debug)]
pub enum ApplicationError {
    NotFound,
    BadRequest(String),
    InternalError(String),
    PayloadTooLarge,
}

/// Reasons an upload is turned down. The display text is shown to the user
/// as-is.
#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("Error: No file selected")]
    NoFileSelected,

    #[error("Error: Images Only!")]
    InvalidFileType,

    #[error("Error: File too large")]
    FileTooLarge,

    #[error("Error: Unexpected field")]
    UnexpectedField(String),

    #[error("Error: Invalid upload request")]
    MalformedRequest,

    #[error("Error: Upload failed")]
    StorageWriteFailure(String),
}
