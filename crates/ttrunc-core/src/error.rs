use thiserror::Error;

#[derive(Error, Debug)]
pub enum TruncateError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("No token limit known for model: {0}")]
    UnknownModel(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TruncateError>;
