//! Error types for cue playback

use cue_core::{CueError, CueId};
use thiserror::Error;

/// Playback errors
///
/// Only adapters and the transport's lookups produce these. The controller
/// itself never fails a command: adapter failures become
/// [`CueEvent::Error`](crate::CueEvent::Error) notifications and invalid
/// transitions are ignored.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The local transport rejected a command
    #[error("Adapter error: {0}")]
    Adapter(String),

    /// No cue (or no controller) exists for this handle
    #[error("Cue not found: {0}")]
    CueNotFound(CueId),

    /// Data model error
    #[error(transparent)]
    Core(#[from] CueError),
}

impl PlaybackError {
    pub fn adapter(message: impl Into<String>) -> Self {
        Self::Adapter(message.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
