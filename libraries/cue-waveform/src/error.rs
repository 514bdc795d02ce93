//! Waveform errors

use thiserror::Error;

/// Result type alias using `WaveformError`
pub type Result<T> = std::result::Result<T, WaveformError>;

/// Waveform error types
#[derive(Error, Debug)]
pub enum WaveformError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    Decode(String),

    /// The file contains nothing that decodes to audio
    #[error("No audio decoded from {0}")]
    Empty(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),
}

impl WaveformError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}
