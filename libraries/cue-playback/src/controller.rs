//! Per-cue playback state machine
//!
//! A [`PlaybackController`] owns one cue's session: its state, the fade in
//! flight, the loop counter and the position. It is driven three ways:
//! - commands from the operator ([`play`](PlaybackController::play),
//!   [`pause`](PlaybackController::pause),
//!   [`stop_with_fade`](PlaybackController::stop_with_fade),
//!   [`stop_immediately`](PlaybackController::stop_immediately),
//!   [`seek`](PlaybackController::seek))
//! - adapter callbacks (`on_*`)
//! - the clock ([`advance`](PlaybackController::advance)), which runs the
//!   fade tick and, for external sources, the position tick
//!
//! The controller never owns the cue. Every call that needs the cue's
//! settings borrows it from the arena for the duration of the call.

use std::time::Duration;

use cue_core::{Cue, CueId, CueSource, LoopMode, RegionTiming};
use tracing::{debug, info, trace, warn};

use crate::adapter::AdapterFactory;
use crate::backend::{ExternalBackend, LocalBackend, PlaybackBackend};
use crate::config::ControllerConfig;
use crate::envelope::{FadeEnvelope, FadeKind};
use crate::error::PlaybackError;
use crate::events::CueEvent;
use crate::gain::GainStage;
use crate::scheduler::{TickKind, TickScheduler};
use crate::session::PlaybackSession;
use crate::types::PlaybackState;

/// Playback controller for one cue
pub struct PlaybackController {
    cue_id: CueId,

    // Local or external, picked once from the cue's source
    backend: Box<dyn PlaybackBackend>,

    // Virtual clock for the fade and position ticks
    scheduler: TickScheduler,

    session: PlaybackSession,

    gain: GainStage,

    // Last volume handed to the backend
    applied_volume: f64,

    config: ControllerConfig,

    // Event queue for UI synchronization
    pending_events: Vec<CueEvent>,
}

impl PlaybackController {
    /// Create the controller for `cue`
    ///
    /// The backend is chosen here from the cue's source and never changes.
    /// The controller starts `Idle` with a silent envelope.
    pub fn new(
        cue_id: CueId,
        cue: &Cue,
        adapters: &mut dyn AdapterFactory,
        config: ControllerConfig,
    ) -> Self {
        let backend: Box<dyn PlaybackBackend> = match cue.source() {
            CueSource::Local { path } => {
                Box::new(LocalBackend::new(adapters.local(path), path.clone()))
            }
            CueSource::Remote { uri } => Box::new(ExternalBackend::new(
                adapters.external(uri),
                uri.clone(),
                cue.remote_duration_ms(),
            )),
        };

        let mut controller = Self {
            cue_id,
            backend,
            scheduler: TickScheduler::new(),
            session: PlaybackSession::default(),
            gain: GainStage::new(0.0, cue.gain(), 1.0),
            applied_volume: 0.0,
            config,
            pending_events: Vec::new(),
        };

        controller.backend.set_playback_rate(cue.playback_rate());
        controller.backend.apply_volume(controller.applied_volume);

        debug!(
            "Created {} controller for {} ({})",
            controller.backend.name(),
            cue_id,
            cue.display_name()
        );
        controller
    }

    // ===== Commands =====

    /// Start, restart or resume playback
    ///
    /// - `Idle`: start at the start marker
    /// - `Paused`: resume from the paused position
    /// - `FadingOut`: restart at the start marker, fading in from the
    ///   current envelope
    /// - `Playing` / `FadingIn`: ignored
    pub fn play(&mut self, cue: &Cue) {
        match self.session.state {
            PlaybackState::Playing | PlaybackState::FadingIn => {
                debug!("{}: play ignored while {}", self.cue_id, self.session.state);
            }
            PlaybackState::Paused => self.resume(cue),
            PlaybackState::Idle | PlaybackState::FadingOut => self.start(cue),
        }
    }

    /// Pause playback, freezing the envelope
    ///
    /// Only meaningful while `Playing` or `FadingIn`; ignored otherwise.
    pub fn pause(&mut self) {
        if !matches!(
            self.session.state,
            PlaybackState::Playing | PlaybackState::FadingIn
        ) {
            debug!("{}: pause ignored while {}", self.cue_id, self.session.state);
            return;
        }

        let snapshot = match self.backend.pause() {
            Ok(position) => position,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        self.scheduler.stop(TickKind::Fade);
        self.session.fade = None;
        self.session.paused_position_ms = Some(snapshot);
        self.session.position_ms = snapshot;

        debug!(
            "{} paused at {}ms (envelope {:.3})",
            self.cue_id, snapshot, self.session.envelope
        );
        self.set_state(PlaybackState::Paused);
        self.sync_position_tick();
    }

    /// Stop with the cue's fade-out
    ///
    /// Without a fade-out (or without a local mixer to fade) the cue stops
    /// at once. Either way [`CueEvent::FadeOutFinished`] fires exactly once
    /// when the cue reaches `Idle`. A paused cue fades out with its
    /// transport still paused.
    pub fn stop_with_fade(&mut self, cue: &Cue) {
        match self.session.state {
            PlaybackState::Idle => {
                debug!("{}: stop ignored while idle", self.cue_id);
                return;
            }
            PlaybackState::FadingOut => {
                debug!("{}: already fading out", self.cue_id);
                return;
            }
            PlaybackState::Playing | PlaybackState::FadingIn | PlaybackState::Paused => {}
        }

        self.session.stop_requested = true;

        let fade_out = cue.fade_out_secs();
        if fade_out > 0.0 && self.backend.fades_audibly() {
            self.begin_fade(FadeKind::Out, fade_out);
            self.set_state(PlaybackState::FadingOut);
        } else {
            self.hard_stop(cue);
            self.emit_fade_out_finished();
        }
    }

    /// Hard cut to `Idle`: no fade, envelope 0, every timer cancelled
    ///
    /// Does not fire [`CueEvent::FadeOutFinished`].
    pub fn stop_immediately(&mut self, cue: &Cue) {
        if self.session.state == PlaybackState::Idle {
            self.scheduler.stop_all();
            return;
        }
        self.hard_stop(cue);
    }

    /// Move the transport while a session is live
    pub fn seek(&mut self, position_ms: u64) {
        if !self.session.state.is_active() {
            debug!("{}: seek ignored while idle", self.cue_id);
            return;
        }

        if let Err(e) = self.backend.seek(position_ms) {
            self.report_error(&e);
            return;
        }

        self.session.position_ms = self.backend.position_ms();
        if self.session.state == PlaybackState::Paused {
            self.session.paused_position_ms = Some(self.session.position_ms);
        }
        self.emit_position();
    }

    /// Advance the clock by `dt`, running every tick that falls due
    pub fn advance(&mut self, cue: &Cue, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while let Some(kind) = self.scheduler.next_due(until) {
            match kind {
                TickKind::Fade => self.on_fade_tick(cue),
                TickKind::Position => self.on_position_tick(cue),
            }
        }
        self.scheduler.settle(until);
    }

    // ===== Adapter callbacks =====

    /// Continuous position callback from a local transport
    ///
    /// Ignored once a stop is under way.
    pub fn on_position_changed(&mut self, cue: &Cue, position_ms: u64) {
        if self.session.hard_stopping || !self.session.state.is_active() {
            trace!("{}: late position {}ms ignored", self.cue_id, position_ms);
            return;
        }

        self.backend.report_position(position_ms);
        let position = self.backend.position_ms();
        self.observe_position(cue, position);
    }

    /// The media duration became known
    ///
    /// Resolves the cue's end marker against it (an unset end adopts the
    /// duration, an end past it is pulled back).
    pub fn on_duration_known(&mut self, cue: &mut Cue, duration_ms: u64) {
        if duration_ms == 0 {
            return;
        }
        self.backend.report_duration(duration_ms);
        self.record_duration(cue, duration_ms);
    }

    /// Intermittent report from an external provider
    ///
    /// Overwrites the position estimate (reconciliation). After a stop only
    /// the duration is kept so a late report cannot revive the session.
    pub fn on_playback_state_reported(
        &mut self,
        cue: &mut Cue,
        position_ms: Option<u64>,
        duration_ms: Option<u64>,
        is_playing: bool,
    ) {
        let duration_ms = duration_ms.filter(|d| *d > 0);
        let new_duration = duration_ms.filter(|d| self.backend.duration_ms() != Some(*d));

        if self.session.hard_stopping || !self.session.state.is_active() {
            if let Some(duration) = new_duration {
                self.backend.report_duration(duration);
                self.record_duration(cue, duration);
            }
            return;
        }

        self.backend.report_state(position_ms, duration_ms, is_playing);
        if let Some(duration) = new_duration {
            self.record_duration(cue, duration);
        }

        self.sync_position_tick();
        let position = self.backend.position_ms();
        self.observe_position(cue, position);
    }

    /// Non-fatal adapter failure; the session is left as it is
    pub fn on_adapter_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}: adapter error: {}", self.cue_id, message);
        self.pending_events.push(CueEvent::Error {
            cue: self.cue_id,
            message,
        });
    }

    // ===== Gain and rate =====

    /// Master volume (already shaped, 0.0 to 1.0)
    pub fn set_master_volume(&mut self, master: f64) {
        self.gain.set_master(master);
        self.apply_volume();
    }

    /// Per-cue gain (0.0 to 2.0)
    pub fn set_track_gain(&mut self, gain: f64) {
        self.gain.set_track_gain(gain);
        self.apply_volume();
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.backend.set_playback_rate(rate);
    }

    /// Re-read gain and rate after the cue was edited
    pub fn refresh_from_cue(&mut self, cue: &Cue) {
        self.set_track_gain(cue.gain());
        self.set_playback_rate(cue.playback_rate());
    }

    // ===== Queries =====

    pub fn cue_id(&self) -> CueId {
        self.cue_id
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn envelope(&self) -> f64 {
        self.session.envelope
    }

    pub fn gain_stage(&self) -> &GainStage {
        &self.gain
    }

    /// Volume currently applied to the transport
    pub fn output_volume(&self) -> f64 {
        self.gain.output()
    }

    pub fn position_ms(&self) -> u64 {
        self.session.position_ms
    }

    /// Media duration, once an adapter reported it
    pub fn duration_ms(&self) -> Option<u64> {
        self.backend.duration_ms()
    }

    /// Total and remaining time of the cue's region at the current position
    pub fn region_timing(&self, cue: &Cue) -> Option<RegionTiming> {
        RegionTiming::compute(cue.region(), self.session.position_ms)
    }

    /// Virtual time of this controller's clock
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn is_tick_running(&self, kind: TickKind) -> bool {
        self.scheduler.is_running(kind)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<CueEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn start(&mut self, cue: &Cue) {
        let start_ms = cue.start_ms();

        self.backend.set_playback_rate(cue.playback_rate());
        self.gain.set_track_gain(cue.gain());

        if let Err(e) = self.backend.start(start_ms) {
            self.report_error(&e);
            return;
        }

        // A restart during a fade-out keeps the current envelope and fades
        // in from it
        self.scheduler.stop(TickKind::Fade);
        self.session.fade = None;

        let loop_remaining = match cue.loop_mode() {
            LoopMode::Count => cue.loop_count().saturating_sub(1),
            LoopMode::None | LoopMode::Infinite => 0,
        };
        self.session.begin(start_ms, loop_remaining);

        info!(
            "{} started at {}ms ({} backend)",
            self.cue_id,
            start_ms,
            self.backend.name()
        );
        self.enter_audible(cue);
        self.emit_position();
    }

    fn resume(&mut self, cue: &Cue) {
        let from = self
            .session
            .paused_position_ms
            .unwrap_or(self.session.position_ms);

        if let Err(e) = self.backend.resume(from) {
            self.report_error(&e);
            return;
        }

        self.session.paused_position_ms = None;
        self.session.stop_requested = false;
        self.session.position_ms = self.backend.position_ms();

        debug!(
            "{} resumed at {}ms (envelope {:.3})",
            self.cue_id, self.session.position_ms, self.session.envelope
        );
        self.enter_audible(cue);
    }

    /// Fade in if the cue has a fade-in, otherwise jump to full envelope
    fn enter_audible(&mut self, cue: &Cue) {
        let fade_in = cue.fade_in_secs();
        if fade_in > 0.0 && self.backend.fades_audibly() {
            self.begin_fade(FadeKind::In, fade_in);
            self.set_state(PlaybackState::FadingIn);
        } else {
            self.set_envelope(1.0);
            self.set_state(PlaybackState::Playing);
        }
        self.sync_position_tick();
    }

    fn begin_fade(&mut self, kind: FadeKind, secs: f64) {
        let fade = FadeEnvelope::from_secs(kind, self.session.envelope, secs);
        debug!(
            "{}: fade {:?} over {:?} from {:.3}",
            self.cue_id,
            kind,
            fade.duration(),
            fade.start_envelope()
        );
        self.session.fade = Some(fade);
        self.scheduler.start(TickKind::Fade, self.config.fade_tick());
    }

    fn hard_stop(&mut self, cue: &Cue) {
        let previous = self.session.state;

        self.session.hard_stopping = true;
        self.session.stop_requested = true;
        self.scheduler.stop_all();

        if let Err(e) = self.backend.stop(cue.start_ms()) {
            self.report_error(&e);
        }

        self.session.end(self.backend.position_ms());
        self.set_envelope(0.0);

        if previous != PlaybackState::Idle {
            info!("{} stopped", self.cue_id);
            self.emit_state_changed(PlaybackState::Idle);
            self.emit_position();
        }
    }

    fn on_fade_tick(&mut self, cue: &Cue) {
        let Some(fade) = self.session.fade else {
            self.scheduler.stop(TickKind::Fade);
            return;
        };
        if self.session.hard_stopping {
            self.scheduler.stop(TickKind::Fade);
            return;
        }

        let elapsed = self
            .scheduler
            .elapsed(TickKind::Fade)
            .unwrap_or_default();
        self.set_envelope(fade.value_at(elapsed));

        if !fade.is_complete(elapsed) {
            return;
        }

        self.scheduler.stop(TickKind::Fade);
        self.session.fade = None;

        match fade.kind() {
            FadeKind::In => {
                self.set_envelope(1.0);
                debug!("{}: fade-in complete", self.cue_id);
                self.set_state(PlaybackState::Playing);
            }
            FadeKind::Out => {
                debug!("{}: fade-out complete", self.cue_id);
                self.hard_stop(cue);
                self.emit_fade_out_finished();
            }
        }
    }

    fn on_position_tick(&mut self, cue: &Cue) {
        if self.session.hard_stopping || !self.backend.wants_position_tick() {
            self.scheduler.stop(TickKind::Position);
            return;
        }

        let interval_ms = self.config.position_tick().as_millis() as u64;
        if let Some(position) = self.backend.on_position_tick(interval_ms) {
            self.observe_position(cue, position);
        }
    }

    fn observe_position(&mut self, cue: &Cue, position_ms: u64) {
        if self.session.position_ms != position_ms {
            self.session.position_ms = position_ms;
            self.emit_position();
        }
        self.check_region_end(cue);
    }

    /// Loop policy, evaluated when the position passes the end marker
    fn check_region_end(&mut self, cue: &Cue) {
        if !matches!(
            self.session.state,
            PlaybackState::Playing | PlaybackState::FadingIn
        ) || self.session.stop_requested
            || self.session.hard_stopping
        {
            return;
        }

        let region = cue.region();
        let Some(end_ms) = region.end_ms.filter(|_| region.is_defined()) else {
            return;
        };
        if self.session.position_ms < end_ms {
            return;
        }

        match cue.loop_mode() {
            LoopMode::Infinite => self.loop_to_start(cue, None),
            LoopMode::Count if self.session.loop_remaining > 0 => {
                self.session.loop_remaining -= 1;
                self.loop_to_start(cue, Some(self.session.loop_remaining));
            }
            LoopMode::None | LoopMode::Count => {
                debug!("{} reached the end of its region at {}ms", self.cue_id, end_ms);
                self.stop_with_fade(cue);
            }
        }
    }

    fn loop_to_start(&mut self, cue: &Cue, remaining: Option<u32>) {
        if let Err(e) = self.backend.seek(cue.start_ms()) {
            self.report_error(&e);
            return;
        }
        self.session.position_ms = self.backend.position_ms();

        debug!("{} looped ({:?} left)", self.cue_id, remaining);
        self.pending_events.push(CueEvent::Looped {
            cue: self.cue_id,
            remaining,
        });
        self.emit_position();
    }

    fn record_duration(&mut self, cue: &mut Cue, duration_ms: u64) {
        if self.backend.caches_duration() {
            cue.set_remote_duration_ms(Some(duration_ms));
        }
        self.pending_events.push(CueEvent::DurationKnown {
            cue: self.cue_id,
            duration_ms,
        });

        if cue.resolve_end_with_duration(duration_ms) {
            debug!(
                "{}: end marker resolved to {:?}ms",
                self.cue_id,
                cue.end_ms()
            );
            self.pending_events.push(CueEvent::RegionChanged {
                cue: self.cue_id,
                start_ms: cue.start_ms(),
                end_ms: cue.end_ms(),
            });
        }
    }

    fn set_envelope(&mut self, envelope: f64) {
        self.gain.set_envelope(envelope);
        self.session.envelope = self.gain.envelope();
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        let volume = self.gain.output();
        self.backend.apply_volume(volume);
        if volume != self.applied_volume {
            self.applied_volume = volume;
            self.pending_events.push(CueEvent::VolumeChanged {
                cue: self.cue_id,
                volume,
            });
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.session.state != state {
            self.session.state = state;
            self.emit_state_changed(state);
        }
    }

    /// Run the position tick only while the backend needs extrapolation
    fn sync_position_tick(&mut self) {
        let wanted = self.session.state.is_active()
            && !self.session.hard_stopping
            && self.backend.wants_position_tick();

        match (wanted, self.scheduler.is_running(TickKind::Position)) {
            (true, false) => self
                .scheduler
                .start(TickKind::Position, self.config.position_tick()),
            (false, true) => self.scheduler.stop(TickKind::Position),
            _ => {}
        }
    }

    fn report_error(&mut self, error: &PlaybackError) {
        self.on_adapter_error(error.to_string());
    }

    fn emit_state_changed(&mut self, state: PlaybackState) {
        self.pending_events.push(CueEvent::StateChanged {
            cue: self.cue_id,
            state,
        });
    }

    fn emit_fade_out_finished(&mut self) {
        self.pending_events
            .push(CueEvent::FadeOutFinished { cue: self.cue_id });
    }

    fn emit_position(&mut self) {
        self.pending_events.push(CueEvent::PositionUpdate {
            cue: self.cue_id,
            position_ms: self.session.position_ms,
            duration_ms: self.backend.duration_ms(),
        });
    }
}
