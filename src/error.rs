use anyhow::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),
    #[error("failed to process the file: {0}")]
    FileProcessing(Error),
    #[error("no valid data found in the file")]
    NoValidData,
    #[error("no record with id {0}")]
    RecordNotFound(u64),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] Error),
}

impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}
