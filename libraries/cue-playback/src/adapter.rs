//! Platform adapters the controller drives
//!
//! Two kinds of playback exist:
//! - [`LocalPlaybackAdapter`]: audio decoded on this machine. Commands take
//!   effect synchronously and the platform reports the position continuously
//!   through [`PlaybackController::on_position_changed`].
//! - [`ExternalPlaybackAdapter`]: a provider playing the track somewhere else.
//!   Commands are fire-and-forget requests; position, duration and playing
//!   state arrive intermittently through
//!   [`PlaybackController::on_playback_state_reported`].
//!
//! Both report the media duration through
//! [`PlaybackController::on_duration_known`] and non-fatal failures through
//! [`PlaybackController::on_adapter_error`].
//!
//! [`PlaybackController::on_position_changed`]: crate::PlaybackController::on_position_changed
//! [`PlaybackController::on_playback_state_reported`]: crate::PlaybackController::on_playback_state_reported
//! [`PlaybackController::on_duration_known`]: crate::PlaybackController::on_duration_known
//! [`PlaybackController::on_adapter_error`]: crate::PlaybackController::on_adapter_error

use std::path::Path;

use crate::error::Result;

/// Local decode/transport for one cue
///
/// Implementors wrap whatever the platform uses to play a file. Errors are
/// reported back to the operator but never abort the session.
pub trait LocalPlaybackAdapter {
    /// Load `path` and start playing at `start_ms`
    fn play(&mut self, path: &Path, start_ms: u64) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    fn seek(&mut self, position_ms: u64) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Current transport position
    fn position_ms(&self) -> u64;

    /// Apply an output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f64);

    /// Apply a transport rate (1.0 = natural speed)
    fn set_playback_rate(&mut self, rate: f64);
}

/// Remote playback provider for one cue
///
/// Every command is a request; the provider's answer (if any) comes back
/// later as a playback state report.
pub trait ExternalPlaybackAdapter {
    /// Ask the provider to play `uri` from `start_ms`
    fn play(&mut self, uri: &str, start_ms: u64);

    fn pause(&mut self);

    fn resume(&mut self);

    fn seek(&mut self, position_ms: u64);

    fn stop(&mut self);
}

/// Creates the adapter for a cue's source
///
/// The transport calls this once per cue when the cue is added; the choice
/// of local or external playback is never revisited afterwards.
pub trait AdapterFactory {
    fn local(&mut self, path: &Path) -> Box<dyn LocalPlaybackAdapter>;

    fn external(&mut self, uri: &str) -> Box<dyn ExternalPlaybackAdapter>;
}
