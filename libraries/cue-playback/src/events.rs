//! Cue Events
//!
//! Event-based communication for display components. Controllers queue
//! events as things happen; callers drain them after each command, callback
//! or clock advance:
//! - State changes (every transition, exactly once)
//! - Fade-out completion (once per stop, faded or not)
//! - Position updates and loop wrap-arounds
//! - Duration and region discovery
//! - Output volume changes
//! - Non-fatal adapter errors

use cue_core::CueId;
use serde::{Deserialize, Serialize};

use crate::types::PlaybackState;

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CueEvent {
    /// Playback state changed
    StateChanged {
        cue: CueId,
        /// The new state
        state: PlaybackState,
    },

    /// A stop completed
    ///
    /// Fires once for every stop-with-fade: after the envelope reached zero,
    /// or immediately when there was nothing to fade. Also fires when the
    /// region ends without a loop to take.
    FadeOutFinished { cue: CueId },

    /// Position changed (local callback or external estimate)
    PositionUpdate {
        cue: CueId,
        position_ms: u64,
        duration_ms: Option<u64>,
    },

    /// Playback wrapped from the end marker back to the start marker
    Looped {
        cue: CueId,
        /// Loops left for counted looping, `None` for infinite looping
        remaining: Option<u32>,
    },

    /// Media duration became known
    DurationKnown { cue: CueId, duration_ms: u64 },

    /// The cue's region changed (end marker resolved against the duration)
    RegionChanged {
        cue: CueId,
        start_ms: u64,
        end_ms: Option<u64>,
    },

    /// Output volume applied to the transport changed
    VolumeChanged { cue: CueId, volume: f64 },

    /// An adapter reported a failure; the session is left as it was
    Error { cue: CueId, message: String },
}

impl CueEvent {
    /// The cue this event is about
    pub fn cue(&self) -> CueId {
        match self {
            CueEvent::StateChanged { cue, .. }
            | CueEvent::FadeOutFinished { cue }
            | CueEvent::PositionUpdate { cue, .. }
            | CueEvent::Looped { cue, .. }
            | CueEvent::DurationKnown { cue, .. }
            | CueEvent::RegionChanged { cue, .. }
            | CueEvent::VolumeChanged { cue, .. }
            | CueEvent::Error { cue, .. } => *cue,
        }
    }

    /// Whether this is a state change into `state`
    pub fn is_state(&self, state: PlaybackState) -> bool {
        matches!(self, CueEvent::StateChanged { state: s, .. } if *s == state)
    }

    pub fn is_fade_out_finished(&self) -> bool {
        matches!(self, CueEvent::FadeOutFinished { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cue_core::{Cue, CueStore};

    #[test]
    fn events_survive_json() {
        let mut store = CueStore::new();
        let cue = store.insert(Cue::from_user_input("/show/rain.wav"));
        let event = CueEvent::StateChanged {
            cue,
            state: PlaybackState::FadingOut,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("StateChanged"));
        assert!(json.contains("FadingOut"));

        let back: CueEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.cue(), cue);
        assert!(back.is_state(PlaybackState::FadingOut));
    }
}
