/// Core error types for the Stagecast engine.
use std::path::PathBuf;

/// A specialized Result type for Stagecast operations.
pub type StageResult<T> = Result<T, StageError>;

/// Top-level error type encompassing all Stagecast subsystems.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("invalid scene document: {0}")]
    InvalidDocument(String),

    #[error("media error: {message} ({source_uri})")]
    Media { message: String, source_uri: String },

    #[error("config error: {message} ({path:?})")]
    Config { message: String, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl StageError {
    /// Create an invalid-document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        StageError::InvalidDocument(message.into())
    }

    /// Create a media error for the given layer source.
    pub fn media(message: impl Into<String>, source_uri: impl Into<String>) -> Self {
        StageError::Media {
            message: message.into(),
            source_uri: source_uri.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        StageError::Config {
            message: message.into(),
            path: path.into(),
        }
    }
}
