//! Core domain types

mod cue;
mod ids;
mod source;

pub use cue::{
    Cue, LoopMode, Region, MAX_FADE_SECS, MAX_GAIN, MAX_LOOP_COUNT, MAX_MARKER_SECS, MAX_PITCH,
    MAX_SPEED, MIN_GAIN, MIN_LOOP_COUNT, MIN_PITCH, MIN_SPEED,
};
pub use ids::CueId;
pub use source::{is_remote_reference, normalize_remote_uri, CueSource};
