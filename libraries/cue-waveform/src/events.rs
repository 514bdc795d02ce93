//! Waveform events

use serde::{Deserialize, Serialize};

/// What a waveform interaction asks of the rest of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveformEvent {
    /// The start marker was dragged
    StartChanged { start_ms: u64 },

    /// The end marker was dragged
    EndChanged { end_ms: u64 },

    /// Scrubbing asks the transport to seek
    SeekRequested { position_ms: u64 },

    /// Decoding finished and peaks are ready to draw
    PeaksReady { duration_ms: u64 },
}
