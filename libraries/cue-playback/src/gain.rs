//! Output gain: envelope × track gain × master, plus the master fader
//!
//! The master fader is shaped with a perceptual power curve
//! `(fader / 100)^2.5`: fine control near silence, a wide loud range.

use cue_core::types::{MAX_GAIN, MIN_GAIN};

use crate::envelope::clamp_unit;

/// Exponent of the master fader curve
const MASTER_CURVE_EXPONENT: f64 = 2.5;

/// Shape a fader position (0-100) into a master volume (0.0-1.0)
///
/// - 0   → 0.0
/// - 50  → 0.177
/// - 80  → 0.572
/// - 100 → 1.0
pub fn shape_master_fader(fader: f64) -> f64 {
    if !fader.is_finite() {
        return 0.0;
    }
    clamp_unit((fader / 100.0).clamp(0.0, 1.0).powf(MASTER_CURVE_EXPONENT))
}

/// Master volume controller with fader shaping and mute
#[derive(Debug, Clone)]
pub struct MasterVolume {
    /// Fader position (0-100)
    level: u8,

    /// Mute state (preserves fader level)
    muted: bool,

    /// Cached shaped volume
    shaped: f64,
}

impl MasterVolume {
    /// Create a master volume at the given fader position (0-100)
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: false,
            shaped: shape_master_fader(f64::from(level)),
        }
    }

    /// Set fader position (0-100)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
        self.shaped = shape_master_fader(f64::from(self.level));
    }

    /// Current fader position (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Mute (preserves fader level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Master volume fed into every cue's gain stage
    ///
    /// Returns 0.0 if muted, otherwise the shaped fader value
    pub fn volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.shaped
        }
    }
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Per-cue gain stage
///
/// Combines the fade envelope, the cue's own gain and the master volume into
/// the single value applied to the transport. The output is always in
/// `[0, 1]`; every setter returns the new output so callers can apply it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainStage {
    envelope: f64,
    track_gain: f64,
    master: f64,
}

impl GainStage {
    pub fn new(envelope: f64, track_gain: f64, master: f64) -> Self {
        Self {
            envelope: clamp_unit(envelope),
            track_gain: clamp_track_gain(track_gain),
            master: clamp_unit(master),
        }
    }

    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    pub fn track_gain(&self) -> f64 {
        self.track_gain
    }

    pub fn master(&self) -> f64 {
        self.master
    }

    pub fn set_envelope(&mut self, envelope: f64) -> f64 {
        self.envelope = clamp_unit(envelope);
        self.output()
    }

    pub fn set_track_gain(&mut self, gain: f64) -> f64 {
        self.track_gain = clamp_track_gain(gain);
        self.output()
    }

    pub fn set_master(&mut self, master: f64) -> f64 {
        self.master = clamp_unit(master);
        self.output()
    }

    /// `clamp(envelope × track_gain × master, 0, 1)`
    pub fn output(&self) -> f64 {
        clamp_unit(self.envelope * self.track_gain * self.master)
    }
}

impl Default for GainStage {
    /// Silent envelope, unity gain, full master
    fn default() -> Self {
        Self::new(0.0, 1.0, 1.0)
    }
}

fn clamp_track_gain(gain: f64) -> f64 {
    if gain.is_finite() {
        gain.clamp(MIN_GAIN, MAX_GAIN)
    } else {
        1.0
    }
}
