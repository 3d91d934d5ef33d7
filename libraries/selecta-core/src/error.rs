/// Core error types for Selecta
use thiserror::Error;

/// Result type alias using `SelectaError`
pub type Result<T> = std::result::Result<T, SelectaError>;

/// Core error type for Selecta
#[derive(Error, Debug)]
pub enum SelectaError {
    /// I/O errors that abort a run (selection directory unreadable, disk full)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Manifest (de)serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Another run holds the selection lock
    #[error("Another rotation is already running (lock file: {0})")]
    AlreadyRunning(String),

    /// The selection directory does not exist and could not be created
    #[error("Selection directory missing: {0}")]
    SelectionMissing(String),
}

impl SelectaError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
