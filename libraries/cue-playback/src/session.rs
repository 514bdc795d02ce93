//! Transient per-cue playback state

use crate::envelope::FadeEnvelope;
use crate::types::PlaybackState;

/// Session owned by a [`PlaybackController`](crate::PlaybackController)
///
/// Reset whenever the cue stops. The two stop flags guard against a late
/// tick or callback re-entering the loop/fade logic after a stop has been
/// issued synchronously.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    pub(crate) state: PlaybackState,
    pub(crate) envelope: f64,
    pub(crate) fade: Option<FadeEnvelope>,
    pub(crate) loop_remaining: u32,
    pub(crate) position_ms: u64,
    pub(crate) paused_position_ms: Option<u64>,
    /// Intent to stop: a stop (with or without fade) was requested
    pub(crate) stop_requested: bool,
    /// Hard stop in progress or done: position callbacks and ticks no-op
    pub(crate) hard_stopping: bool,
}

impl PlaybackSession {
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current envelope (0.0 to 1.0)
    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    /// The fade in flight, if any
    pub fn fade(&self) -> Option<&FadeEnvelope> {
        self.fade.as_ref()
    }

    /// Loops left before counted looping stops
    pub fn loop_remaining(&self) -> u32 {
        self.loop_remaining
    }

    /// Last known position (local callback or external estimate)
    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    /// Position captured by the last pause
    pub fn paused_position_ms(&self) -> Option<u64> {
        self.paused_position_ms
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Fresh session for a new start
    pub(crate) fn begin(&mut self, position_ms: u64, loop_remaining: u32) {
        self.loop_remaining = loop_remaining;
        self.position_ms = position_ms;
        self.paused_position_ms = None;
        self.stop_requested = false;
        self.hard_stopping = false;
    }

    /// Torn-down session resting at `position_ms`
    pub(crate) fn end(&mut self, position_ms: u64) {
        self.state = PlaybackState::Idle;
        self.envelope = 0.0;
        self.fade = None;
        self.loop_remaining = 0;
        self.position_ms = position_ms;
        self.paused_position_ms = None;
        self.stop_requested = true;
        self.hard_stopping = true;
    }
}
