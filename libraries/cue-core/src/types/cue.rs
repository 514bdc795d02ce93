//! The cue: one configured playable unit

use serde::{Deserialize, Serialize};

use super::source::CueSource;

/// Longest fade the operator can configure (seconds)
pub const MAX_FADE_SECS: f64 = 60.0;

/// Largest marker value the operator can configure (seconds)
pub const MAX_MARKER_SECS: f64 = 99_999.0;

/// Loop count range for [`LoopMode::Count`]
pub const MIN_LOOP_COUNT: u32 = 1;
pub const MAX_LOOP_COUNT: u32 = 999;

/// Per-cue gain range (2.0 is roughly +6 dB)
pub const MIN_GAIN: f64 = 0.0;
pub const MAX_GAIN: f64 = 2.0;

/// Playback speed range (local sources only)
pub const MIN_SPEED: f64 = 0.25;
pub const MAX_SPEED: f64 = 4.0;

/// Pitch shift range in semitones (local sources only)
pub const MIN_PITCH: f64 = -24.0;
pub const MAX_PITCH: f64 = 24.0;

/// What happens when playback reaches the end marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Stop (with the configured fade-out)
    #[default]
    None,

    /// Jump back to the start marker forever
    Infinite,

    /// Play the region `loop_count` times in total
    Count,
}

impl LoopMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopMode::None => "none",
            LoopMode::Infinite => "infinite",
            LoopMode::Count => "count",
        }
    }

    /// Parse the persisted name; unknown names fall back to `None`
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "infinite" => LoopMode::Infinite,
            "count" => LoopMode::Count,
            _ => LoopMode::None,
        }
    }
}

/// The `[start, end)` window of a cue, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start_ms: u64,
    pub end_ms: Option<u64>,
}

impl Region {
    /// A region is defined only when its end lies after its start
    pub fn is_defined(&self) -> bool {
        matches!(self.end_ms, Some(end) if end > self.start_ms)
    }

    /// Length of a defined region
    pub fn length_ms(&self) -> Option<u64> {
        match self.end_ms {
            Some(end) if end > self.start_ms => Some(end - self.start_ms),
            _ => None,
        }
    }
}

/// A configured playable unit
///
/// The source is fixed at construction. Every numeric setter clamps instead
/// of rejecting, so a cue is always playable even after a careless edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    source: CueSource,

    /// Operator-facing name (falls back to the file name when empty)
    pub name: String,

    /// Free-form operator notes
    pub notes: String,

    /// Single-character hotkey
    pub hotkey: Option<char>,

    /// Color tag as a hex ARGB string, opaque to playback
    pub color: Option<String>,

    /// Effect preset name, opaque to playback
    pub effect: Option<String>,

    start_secs: f64,
    end_secs: Option<f64>,
    fade_in_secs: f64,
    fade_out_secs: f64,
    loop_mode: LoopMode,
    loop_count: u32,
    gain: f64,
    speed: f64,
    pitch_semitones: f64,

    /// Cached duration of a remote track (the provider tells us, we cannot decode)
    remote_duration_ms: Option<u64>,
}

impl Cue {
    /// Create a cue for the given source with neutral settings
    pub fn new(source: CueSource) -> Self {
        Self {
            source,
            name: String::new(),
            notes: String::new(),
            hotkey: None,
            color: None,
            effect: None,
            start_secs: 0.0,
            end_secs: None,
            fade_in_secs: 0.0,
            fade_out_secs: 0.0,
            loop_mode: LoopMode::None,
            loop_count: MIN_LOOP_COUNT,
            gain: 1.0,
            speed: 1.0,
            pitch_semitones: 0.0,
            remote_duration_ms: None,
        }
    }

    /// Create a cue from a raw user string (path, track URI or share URL)
    pub fn from_user_input(input: &str) -> Self {
        Self::new(CueSource::from_user_input(input))
    }

    pub fn source(&self) -> &CueSource {
        &self.source
    }

    pub fn is_remote(&self) -> bool {
        self.source.is_remote()
    }

    /// Name shown to the operator
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        match &self.source {
            CueSource::Local { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            CueSource::Remote { uri } => uri.clone(),
        }
    }

    // ===== Markers =====

    pub fn start_secs(&self) -> f64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> Option<f64> {
        self.end_secs
    }

    pub fn set_start_secs(&mut self, secs: f64) {
        self.start_secs = clamp_finite(secs, 0.0, MAX_MARKER_SECS, 0.0);
    }

    /// Set the end marker; `None` (or a non-positive value) means "until the end"
    pub fn set_end_secs(&mut self, secs: Option<f64>) {
        self.end_secs = secs
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| s.min(MAX_MARKER_SECS));
    }

    pub fn start_ms(&self) -> u64 {
        secs_to_ms(self.start_secs)
    }

    pub fn end_ms(&self) -> Option<u64> {
        self.end_secs.map(secs_to_ms)
    }

    pub fn region(&self) -> Region {
        Region {
            start_ms: self.start_ms(),
            end_ms: self.end_ms(),
        }
    }

    /// Resolve the end marker once the media duration is known
    ///
    /// An unset end adopts the duration; an end past the duration is pulled
    /// back to it. Returns true when the end marker changed.
    pub fn resolve_end_with_duration(&mut self, duration_ms: u64) -> bool {
        if duration_ms == 0 {
            return false;
        }
        let duration_secs = duration_ms as f64 / 1000.0;
        match self.end_secs {
            Some(end) if end <= duration_secs => false,
            _ => {
                self.end_secs = Some(duration_secs.min(MAX_MARKER_SECS));
                true
            }
        }
    }

    // ===== Fades =====

    pub fn fade_in_secs(&self) -> f64 {
        self.fade_in_secs
    }

    pub fn fade_out_secs(&self) -> f64 {
        self.fade_out_secs
    }

    pub fn set_fade_in_secs(&mut self, secs: f64) {
        self.fade_in_secs = clamp_finite(secs, 0.0, MAX_FADE_SECS, 0.0);
    }

    pub fn set_fade_out_secs(&mut self, secs: f64) {
        self.fade_out_secs = clamp_finite(secs, 0.0, MAX_FADE_SECS, 0.0);
    }

    // ===== Looping =====

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn set_loop_count(&mut self, count: u32) {
        self.loop_count = count.clamp(MIN_LOOP_COUNT, MAX_LOOP_COUNT);
    }

    // ===== Level and rate =====

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = clamp_finite(gain, MIN_GAIN, MAX_GAIN, 1.0);
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_finite(speed, MIN_SPEED, MAX_SPEED, 1.0);
    }

    pub fn pitch_semitones(&self) -> f64 {
        self.pitch_semitones
    }

    pub fn set_pitch_semitones(&mut self, semitones: f64) {
        self.pitch_semitones = clamp_finite(semitones, MIN_PITCH, MAX_PITCH, 0.0);
    }

    /// Transport rate for this cue
    ///
    /// Pitch shifts the rate by `2^(semitones/12)` on top of speed. Remote
    /// tracks are always played at their natural rate.
    pub fn playback_rate(&self) -> f64 {
        if self.is_remote() {
            return 1.0;
        }
        self.speed * 2f64.powf(self.pitch_semitones / 12.0)
    }

    // ===== Remote duration =====

    pub fn remote_duration_ms(&self) -> Option<u64> {
        self.remote_duration_ms
    }

    pub fn set_remote_duration_ms(&mut self, duration_ms: Option<u64>) {
        self.remote_duration_ms = duration_ms.filter(|d| *d > 0);
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

/// Clamp to a range, replacing NaN/infinite input with a fallback
pub(crate) fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn local_cue() -> Cue {
        Cue::new(CueSource::Local {
            path: PathBuf::from("/show/door-slam.wav"),
        })
    }

    #[test]
    fn defaults_are_neutral() {
        let cue = local_cue();
        assert_eq!(cue.gain(), 1.0);
        assert_eq!(cue.speed(), 1.0);
        assert_eq!(cue.loop_mode(), LoopMode::None);
        assert_eq!(cue.loop_count(), 1);
        assert_eq!(cue.end_secs(), None);
        assert!(!cue.region().is_defined());
    }

    #[test]
    fn setters_clamp_instead_of_rejecting() {
        let mut cue = local_cue();
        cue.set_fade_in_secs(-3.0);
        cue.set_fade_out_secs(500.0);
        cue.set_loop_count(0);
        cue.set_gain(7.5);
        cue.set_speed(0.01);
        cue.set_pitch_semitones(f64::NAN);

        assert_eq!(cue.fade_in_secs(), 0.0);
        assert_eq!(cue.fade_out_secs(), MAX_FADE_SECS);
        assert_eq!(cue.loop_count(), 1);
        assert_eq!(cue.gain(), MAX_GAIN);
        assert_eq!(cue.speed(), MIN_SPEED);
        assert_eq!(cue.pitch_semitones(), 0.0);
    }

    #[test]
    fn region_with_end_before_start_is_undefined() {
        let mut cue = local_cue();
        cue.set_start_secs(10.0);
        cue.set_end_secs(Some(5.0));
        assert!(!cue.region().is_defined());
        assert_eq!(cue.region().length_ms(), None);

        cue.set_end_secs(Some(12.5));
        assert_eq!(cue.region().length_ms(), Some(2500));
    }

    #[test]
    fn end_resolves_lazily_against_duration() {
        let mut cue = local_cue();
        assert!(cue.resolve_end_with_duration(90_000));
        assert_eq!(cue.end_ms(), Some(90_000));

        // Already inside the media: untouched
        cue.set_end_secs(Some(30.0));
        assert!(!cue.resolve_end_with_duration(90_000));
        assert_eq!(cue.end_ms(), Some(30_000));

        // Past the media: pulled back
        cue.set_end_secs(Some(120.0));
        assert!(cue.resolve_end_with_duration(90_000));
        assert_eq!(cue.end_ms(), Some(90_000));
    }

    #[test]
    fn playback_rate_combines_speed_and_pitch() {
        let mut cue = local_cue();
        cue.set_speed(1.5);
        cue.set_pitch_semitones(12.0);
        assert!((cue.playback_rate() - 3.0).abs() < 1e-9);

        let mut remote = Cue::from_user_input("spotify:track:abc");
        remote.set_speed(2.0);
        assert_eq!(remote.playback_rate(), 1.0);
    }

    #[test]
    fn display_name_falls_back_to_file_name() {
        let mut cue = local_cue();
        assert_eq!(cue.display_name(), "door-slam.wav");
        cue.name = "Door".to_string();
        assert_eq!(cue.display_name(), "Door");
    }

    #[test]
    fn loop_mode_lenient_parse() {
        assert_eq!(LoopMode::parse_lenient("Count"), LoopMode::Count);
        assert_eq!(LoopMode::parse_lenient("infinite"), LoopMode::Infinite);
        assert_eq!(LoopMode::parse_lenient("bogus"), LoopMode::None);
    }
}
