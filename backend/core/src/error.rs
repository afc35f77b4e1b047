use thiserror::Error;

/// Top-level error type for the Opsy dashboard runtime.
#[derive(Debug, Error)]
pub enum OpsyError {
    #[error("unknown severity level: {0}")]
    UnknownLevel(String),

    #[error("fetch from {url} failed: {message}")]
    FetchError { url: String, message: String },
}

pub type Result<T> = std::result::Result<T, OpsyError>;
