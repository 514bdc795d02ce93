//! Core types for cue playback

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of one cue's playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not playing, no session
    #[default]
    Idle,

    /// Playing at full envelope
    Playing,

    /// Paused mid-region; envelope frozen
    Paused,

    /// Playing while the envelope rises
    FadingIn,

    /// Playing while the envelope decays towards a stop
    FadingOut,
}

impl PlaybackState {
    /// Playing, fading in or fading out
    pub fn is_audible(self) -> bool {
        matches!(
            self,
            PlaybackState::Playing | PlaybackState::FadingIn | PlaybackState::FadingOut
        )
    }

    /// Any state with a live session
    pub fn is_active(self) -> bool {
        self != PlaybackState::Idle
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::FadingIn => "fading-in",
            PlaybackState::FadingOut => "fading-out",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
