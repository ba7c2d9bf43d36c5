//! Error types shared across GrabMe crates.

use std::path::PathBuf;

/// Top-level error type for GrabMe operations.
#[derive(Debug, thiserror::Error)]
pub enum GrabmeError {
    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GrabmeError.
pub type GrabmeResult<T> = Result<T, GrabmeError>;

impl GrabmeError {
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
