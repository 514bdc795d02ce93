//! Playback backends
//!
//! The controller talks to exactly one [`PlaybackBackend`], chosen from the
//! cue's source when the controller is built. Everything that differs
//! between local decoding and a remote provider lives behind this trait, so
//! the state machine reads the same for both.

use std::path::PathBuf;

use tracing::trace;

use crate::adapter::{ExternalPlaybackAdapter, LocalPlaybackAdapter};
use crate::error::Result;
use crate::position::PositionEstimator;

pub(crate) trait PlaybackBackend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Start playing from `start_ms`
    fn start(&mut self, start_ms: u64) -> Result<()>;

    /// Pause, returning the position to resume from
    fn pause(&mut self) -> Result<u64>;

    /// Resume after a pause at `from_ms`
    fn resume(&mut self, from_ms: u64) -> Result<()>;

    fn seek(&mut self, position_ms: u64) -> Result<()>;

    /// Stop and rest at `rewind_to_ms`
    fn stop(&mut self, rewind_to_ms: u64) -> Result<()>;

    /// Last known position
    fn position_ms(&self) -> u64;

    fn duration_ms(&self) -> Option<u64>;

    /// Whether an envelope fade is audible (there is a local mixer)
    fn fades_audibly(&self) -> bool;

    /// Whether a discovered duration should be cached on the cue
    fn caches_duration(&self) -> bool;

    fn apply_volume(&mut self, volume: f64);

    fn set_playback_rate(&mut self, rate: f64);

    /// Whether the position must be extrapolated on a tick right now
    fn wants_position_tick(&self) -> bool;

    /// One extrapolation tick; returns the new position if it moved
    fn on_position_tick(&mut self, interval_ms: u64) -> Option<u64>;

    /// Continuous position callback
    fn report_position(&mut self, position_ms: u64);

    fn report_duration(&mut self, duration_ms: u64);

    /// Intermittent provider report
    fn report_state(&mut self, position_ms: Option<u64>, duration_ms: Option<u64>, playing: bool);
}

/// Locally decoded file
pub(crate) struct LocalBackend {
    adapter: Box<dyn LocalPlaybackAdapter>,
    path: PathBuf,
    position_ms: u64,
    duration_ms: Option<u64>,
}

impl LocalBackend {
    pub(crate) fn new(adapter: Box<dyn LocalPlaybackAdapter>, path: PathBuf) -> Self {
        Self {
            adapter,
            path,
            position_ms: 0,
            duration_ms: None,
        }
    }
}

impl PlaybackBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn start(&mut self, start_ms: u64) -> Result<()> {
        self.adapter.play(&self.path, start_ms)?;
        self.position_ms = start_ms;
        Ok(())
    }

    fn pause(&mut self) -> Result<u64> {
        let snapshot = self.adapter.position_ms();
        self.adapter.pause()?;
        self.position_ms = snapshot;
        Ok(snapshot)
    }

    fn resume(&mut self, from_ms: u64) -> Result<()> {
        self.adapter.seek(from_ms)?;
        self.adapter.resume()?;
        self.position_ms = from_ms;
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.adapter.seek(position_ms)?;
        self.position_ms = position_ms;
        Ok(())
    }

    fn stop(&mut self, rewind_to_ms: u64) -> Result<()> {
        self.position_ms = rewind_to_ms;
        self.adapter.stop()
    }

    fn position_ms(&self) -> u64 {
        self.position_ms
    }

    fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    fn fades_audibly(&self) -> bool {
        true
    }

    fn caches_duration(&self) -> bool {
        false
    }

    fn apply_volume(&mut self, volume: f64) {
        self.adapter.set_volume(volume);
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.adapter.set_playback_rate(rate);
    }

    fn wants_position_tick(&self) -> bool {
        false
    }

    fn on_position_tick(&mut self, _interval_ms: u64) -> Option<u64> {
        None
    }

    fn report_position(&mut self, position_ms: u64) {
        self.position_ms = position_ms;
    }

    fn report_duration(&mut self, duration_ms: u64) {
        if duration_ms > 0 {
            self.duration_ms = Some(duration_ms);
        }
    }

    fn report_state(&mut self, position_ms: Option<u64>, duration_ms: Option<u64>, _playing: bool) {
        if let Some(duration) = duration_ms {
            self.report_duration(duration);
        }
        if let Some(position) = position_ms {
            self.position_ms = position;
        }
    }
}

/// Track played by a remote provider
pub(crate) struct ExternalBackend {
    adapter: Box<dyn ExternalPlaybackAdapter>,
    uri: String,
    estimate: PositionEstimator,
}

impl ExternalBackend {
    pub(crate) fn new(
        adapter: Box<dyn ExternalPlaybackAdapter>,
        uri: String,
        known_duration_ms: Option<u64>,
    ) -> Self {
        Self {
            adapter,
            uri,
            estimate: PositionEstimator::new(known_duration_ms),
        }
    }
}

impl PlaybackBackend for ExternalBackend {
    fn name(&self) -> &'static str {
        "external"
    }

    fn start(&mut self, start_ms: u64) -> Result<()> {
        self.adapter.play(&self.uri, start_ms);
        self.estimate.start_at(start_ms);
        Ok(())
    }

    fn pause(&mut self) -> Result<u64> {
        self.adapter.pause();
        self.estimate.set_playing(false);
        Ok(self.estimate.position_ms())
    }

    fn resume(&mut self, _from_ms: u64) -> Result<()> {
        // The provider keeps its own paused position; seeking here would
        // race its answer to the pause request.
        self.adapter.resume();
        self.estimate.set_playing(true);
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.adapter.seek(position_ms);
        self.estimate.set_position(position_ms);
        Ok(())
    }

    fn stop(&mut self, rewind_to_ms: u64) -> Result<()> {
        self.adapter.stop();
        self.estimate.reset(rewind_to_ms);
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        self.estimate.position_ms()
    }

    fn duration_ms(&self) -> Option<u64> {
        self.estimate.duration_ms()
    }

    fn fades_audibly(&self) -> bool {
        false
    }

    fn caches_duration(&self) -> bool {
        true
    }

    fn apply_volume(&mut self, volume: f64) {
        trace!("External playback has no local mixer, volume {:.3} not applied", volume);
    }

    fn set_playback_rate(&mut self, _rate: f64) {}

    fn wants_position_tick(&self) -> bool {
        self.estimate.is_playing()
    }

    fn on_position_tick(&mut self, interval_ms: u64) -> Option<u64> {
        self.estimate
            .advance(interval_ms)
            .then(|| self.estimate.position_ms())
    }

    fn report_position(&mut self, position_ms: u64) {
        self.estimate.set_position(position_ms);
    }

    fn report_duration(&mut self, duration_ms: u64) {
        self.estimate.set_duration(duration_ms);
    }

    fn report_state(&mut self, position_ms: Option<u64>, duration_ms: Option<u64>, playing: bool) {
        self.estimate.reconcile(position_ms, duration_ms, playing);
    }
}
