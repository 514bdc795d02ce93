/// Core error types for Cue Player
use thiserror::Error;

use crate::types::CueId;

/// Result type alias using `CueError`
pub type Result<T> = std::result::Result<T, CueError>;

/// Core error type for Cue Player
#[derive(Error, Debug)]
pub enum CueError {
    /// A persisted cue record could not be turned into a cue
    #[error("Invalid cue record: {0}")]
    InvalidRecord(String),

    /// Cue handle does not resolve (removed or never issued)
    #[error("Cue not found: {0}")]
    CueNotFound(CueId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CueError {
    /// Create an invalid record error
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
