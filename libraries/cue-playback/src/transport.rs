//! Show-level transport
//!
//! [`CueTransport`] owns the cue arena and one controller per cue, and keeps
//! track of the single *current* cue:
//! - triggering a cue when nothing is current plays it
//! - triggering the current cue resumes it when paused, otherwise stops it
//!   with its fade
//! - triggering another cue fades the current one out and starts the new
//!   one when (and only when) the fade-out finishes; the latest trigger wins
//! - [`CueTransport::go`] steps through the show in order, wrapping around
//!
//! Every controller runs on the same clock: [`CueTransport::advance`] moves
//! them all by the same step.

use std::collections::BTreeMap;
use std::time::Duration;

use cue_core::{Cue, CueId, CueStore};
use tracing::{debug, info, warn};

use crate::adapter::AdapterFactory;
use crate::config::ControllerConfig;
use crate::controller::PlaybackController;
use crate::error::{PlaybackError, Result};
use crate::events::CueEvent;
use crate::gain::MasterVolume;
use crate::types::PlaybackState;

/// Cue arena plus the controllers that play it
pub struct CueTransport {
    store: CueStore,

    // Ordered by handle so every advance visits controllers in the same order
    controllers: BTreeMap<CueId, PlaybackController>,

    adapters: Box<dyn AdapterFactory>,

    config: ControllerConfig,

    master: MasterVolume,

    current: Option<CueId>,

    // Cue to start once the current cue's fade-out finishes
    pending: Option<CueId>,

    pending_events: Vec<CueEvent>,
}

impl CueTransport {
    pub fn new(adapters: Box<dyn AdapterFactory>, config: ControllerConfig) -> Self {
        Self {
            store: CueStore::new(),
            controllers: BTreeMap::new(),
            adapters,
            config,
            master: MasterVolume::default(),
            current: None,
            pending: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Cues =====

    /// Add a cue and build its controller
    pub fn add_cue(&mut self, cue: Cue) -> CueId {
        let id = self.store.insert(cue);
        if let Some(cue) = self.store.get(id) {
            let mut controller =
                PlaybackController::new(id, cue, self.adapters.as_mut(), self.config);
            controller.set_master_volume(self.master.volume());
            self.pending_events.extend(controller.drain_events());
            self.controllers.insert(id, controller);
        }
        debug!("Added {}", id);
        id
    }

    /// Remove a cue, stopping it immediately first
    pub fn remove_cue(&mut self, id: CueId) -> Result<Cue> {
        if let (Some(cue), Some(controller)) = (self.store.get(id), self.controllers.get_mut(&id)) {
            controller.stop_immediately(cue);
            self.pending_events.extend(controller.drain_events());
        }
        self.controllers.remove(&id);

        // A removed current cue never reports a finished fade, so nothing
        // may wait on it
        if self.current == Some(id) {
            self.current = None;
            self.pending = None;
        }
        if self.pending == Some(id) {
            self.pending = None;
        }

        self.store.remove(id).ok_or(PlaybackError::CueNotFound(id))
    }

    pub fn cue(&self, id: CueId) -> Option<&Cue> {
        self.store.get(id)
    }

    pub fn store(&self) -> &CueStore {
        &self.store
    }

    /// Edit a cue in place; gain and rate changes apply immediately
    pub fn update_cue(&mut self, id: CueId, edit: impl FnOnce(&mut Cue)) -> Result<()> {
        let cue = self
            .store
            .get_mut(id)
            .ok_or(PlaybackError::CueNotFound(id))?;
        edit(cue);

        if let Some(controller) = self.controllers.get_mut(&id) {
            controller.refresh_from_cue(cue);
        }
        self.service();
        Ok(())
    }

    pub fn controller(&self, id: CueId) -> Option<&PlaybackController> {
        self.controllers.get(&id)
    }

    pub fn state(&self, id: CueId) -> Option<PlaybackState> {
        self.controllers.get(&id).map(PlaybackController::state)
    }

    /// The cue the operator is working with
    pub fn current(&self) -> Option<CueId> {
        self.current
    }

    /// The cue waiting for the current cue's fade-out
    pub fn pending(&self) -> Option<CueId> {
        self.pending
    }

    // ===== Operator commands =====

    /// Play/stop toggle for a cue
    pub fn trigger(&mut self, id: CueId) -> Result<()> {
        self.require(id)?;

        match self.current {
            None => self.start_current(id),
            Some(current) if current == id => {
                let state = self.state(id).unwrap_or_default();
                match state {
                    PlaybackState::Paused | PlaybackState::Idle => {
                        self.with_cue(id, |c, cue| c.play(cue));
                    }
                    PlaybackState::Playing
                    | PlaybackState::FadingIn
                    | PlaybackState::FadingOut => {
                        self.with_cue(id, |c, cue| c.stop_with_fade(cue));
                        self.current = None;
                        self.pending = None;
                    }
                }
            }
            Some(current) => {
                if self.state(current).is_some_and(PlaybackState::is_active) {
                    debug!("{} queued after {} fades out", id, current);
                    self.pending = Some(id);
                    self.with_cue(current, |c, cue| c.stop_with_fade(cue));
                } else {
                    self.start_current(id);
                }
            }
        }

        self.service();
        Ok(())
    }

    /// Trigger the first cue bound to `key`
    pub fn trigger_hotkey(&mut self, key: char) -> Result<Option<CueId>> {
        match self.store.find_by_hotkey(key) {
            Some(id) => {
                self.trigger(id)?;
                Ok(Some(id))
            }
            None => {
                debug!("No cue bound to hotkey {:?}", key);
                Ok(None)
            }
        }
    }

    pub fn pause(&mut self, id: CueId) -> Result<()> {
        self.require(id)?;
        if let Some(controller) = self.controllers.get_mut(&id) {
            controller.pause();
        }
        self.service();
        Ok(())
    }

    pub fn seek(&mut self, id: CueId, position_ms: u64) -> Result<()> {
        self.require(id)?;
        if let Some(controller) = self.controllers.get_mut(&id) {
            controller.seek(position_ms);
        }
        self.service();
        Ok(())
    }

    /// Trigger the cue after the current one, wrapping to the first
    ///
    /// Steps from the pending cue when one is waiting, so repeated presses
    /// during a fade-out keep moving forward. Returns the triggered cue,
    /// `None` when the show is empty.
    pub fn go(&mut self) -> Result<Option<CueId>> {
        let ids = self.store.ids();
        let Some(first) = ids.first().copied() else {
            debug!("Go ignored: no cues");
            return Ok(None);
        };

        let next = self
            .pending
            .or(self.current)
            .and_then(|from| ids.iter().position(|id| *id == from))
            .and_then(|index| ids.get(index + 1).copied())
            .unwrap_or(first);

        info!("Go: {}", next);
        self.trigger(next)?;
        Ok(Some(next))
    }

    /// Pause the current cue, if any
    pub fn pause_current(&mut self) {
        if let Some(current) = self.current {
            if let Some(controller) = self.controllers.get_mut(&current) {
                controller.pause();
            }
        }
        self.service();
    }

    /// Stop the current cue with its fade; nothing is current afterwards
    pub fn stop_current(&mut self) {
        self.pending = None;
        if let Some(current) = self.current.take() {
            self.with_cue(current, |c, cue| c.stop_with_fade(cue));
        }
        self.service();
    }

    /// Stop every cue at once and forget any pending start
    pub fn panic(&mut self) {
        info!("Panic: stopping every cue");
        self.current = None;
        self.pending = None;
        for (id, controller) in &mut self.controllers {
            if let Some(cue) = self.store.get(*id) {
                controller.stop_immediately(cue);
            }
        }
        self.service();
    }

    // ===== Master =====

    /// Set the master fader (0-100) for every cue
    pub fn set_master_fader(&mut self, level: u8) {
        self.master.set_level(level);
        self.broadcast_master();
    }

    pub fn master_fader(&self) -> u8 {
        self.master.level()
    }

    pub fn master(&self) -> &MasterVolume {
        &self.master
    }

    pub fn mute_master(&mut self) {
        self.master.mute();
        self.broadcast_master();
    }

    pub fn unmute_master(&mut self) {
        self.master.unmute();
        self.broadcast_master();
    }

    // ===== Clock =====

    /// Advance every controller by `dt`
    pub fn advance(&mut self, dt: Duration) {
        for (id, controller) in &mut self.controllers {
            if let Some(cue) = self.store.get(*id) {
                controller.advance(cue, dt);
            }
        }
        self.service();
    }

    // ===== Adapter callbacks =====

    pub fn on_position_changed(&mut self, id: CueId, position_ms: u64) -> Result<()> {
        let cue = self.store.get(id).ok_or(PlaybackError::CueNotFound(id))?;
        let controller = self
            .controllers
            .get_mut(&id)
            .ok_or(PlaybackError::CueNotFound(id))?;
        controller.on_position_changed(cue, position_ms);
        self.service();
        Ok(())
    }

    pub fn on_duration_known(&mut self, id: CueId, duration_ms: u64) -> Result<()> {
        let cue = self
            .store
            .get_mut(id)
            .ok_or(PlaybackError::CueNotFound(id))?;
        let controller = self
            .controllers
            .get_mut(&id)
            .ok_or(PlaybackError::CueNotFound(id))?;
        controller.on_duration_known(cue, duration_ms);
        self.service();
        Ok(())
    }

    pub fn on_playback_state_reported(
        &mut self,
        id: CueId,
        position_ms: Option<u64>,
        duration_ms: Option<u64>,
        is_playing: bool,
    ) -> Result<()> {
        let cue = self
            .store
            .get_mut(id)
            .ok_or(PlaybackError::CueNotFound(id))?;
        let controller = self
            .controllers
            .get_mut(&id)
            .ok_or(PlaybackError::CueNotFound(id))?;
        controller.on_playback_state_reported(cue, position_ms, duration_ms, is_playing);
        self.service();
        Ok(())
    }

    pub fn on_adapter_error(&mut self, id: CueId, message: impl Into<String>) -> Result<()> {
        let controller = self
            .controllers
            .get_mut(&id)
            .ok_or(PlaybackError::CueNotFound(id))?;
        controller.on_adapter_error(message);
        self.service();
        Ok(())
    }

    // ===== Events =====

    /// Drain all pending events, in the order they happened
    pub fn drain_events(&mut self) -> Vec<CueEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn require(&self, id: CueId) -> Result<()> {
        if self.store.contains(id) && self.controllers.contains_key(&id) {
            Ok(())
        } else {
            Err(PlaybackError::CueNotFound(id))
        }
    }

    fn with_cue(&mut self, id: CueId, command: impl FnOnce(&mut PlaybackController, &Cue)) {
        if let (Some(cue), Some(controller)) = (self.store.get(id), self.controllers.get_mut(&id)) {
            command(controller, cue);
        }
    }

    fn start_current(&mut self, id: CueId) {
        self.current = Some(id);
        self.pending = None;
        self.with_cue(id, |c, cue| c.play(cue));
    }

    fn broadcast_master(&mut self) {
        let volume = self.master.volume();
        for controller in self.controllers.values_mut() {
            controller.set_master_volume(volume);
        }
        self.service();
    }

    /// Collect controller events and react to completed fade-outs
    ///
    /// Starting a pending cue can itself produce events (an external cue
    /// that stops at once), so this runs until every queue is empty.
    fn service(&mut self) {
        loop {
            let mut finished = Vec::new();
            let mut collected = false;

            for controller in self.controllers.values_mut() {
                for event in controller.drain_events() {
                    collected = true;
                    if let CueEvent::FadeOutFinished { cue } = event {
                        finished.push(cue);
                    }
                    self.pending_events.push(event);
                }
            }

            if !collected {
                break;
            }

            for cue in finished {
                self.on_fade_out_finished(cue);
            }
        }
    }

    fn on_fade_out_finished(&mut self, id: CueId) {
        if self.current != Some(id) {
            return;
        }

        match self.pending.take() {
            Some(next) if self.store.contains(next) => {
                info!("{} faded out, starting {}", id, next);
                self.start_current(next);
            }
            Some(next) => {
                warn!("Pending cue {} no longer exists", next);
                self.current = None;
            }
            None => {
                debug!("{} finished", id);
                self.current = None;
            }
        }
    }
}
