//! Shared test infrastructure: mock adapters that record every command

use cue_core::{Cue, CueId, CueStore};
use cue_playback::{
    AdapterFactory, ControllerConfig, CueEvent, ExternalPlaybackAdapter, LocalPlaybackAdapter,
    PlaybackController, PlaybackError, Result,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// A command received by a mock adapter
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play { source: String, start_ms: u64 },
    Pause,
    Resume,
    Seek(u64),
    Stop,
}

/// What a mock adapter has been told, shared with the test
#[derive(Debug)]
pub struct Device {
    pub commands: Vec<Command>,
    pub position_ms: u64,
    pub volume: f64,
    pub rate: f64,
    /// Fail every command while set (local adapters only)
    pub failing: bool,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            position_ms: 0,
            volume: 0.0,
            rate: 1.0,
            failing: false,
        }
    }
}

pub type SharedDevice = Rc<RefCell<Device>>;

/// Local adapter recording into a shared device
pub struct MockLocal(pub SharedDevice);

impl MockLocal {
    fn command(&self, command: Command) -> Result<()> {
        let mut device = self.0.borrow_mut();
        if device.failing {
            return Err(PlaybackError::adapter(format!("{:?} failed", command)));
        }
        match command {
            Command::Play { start_ms, .. } => device.position_ms = start_ms,
            Command::Seek(position_ms) => device.position_ms = position_ms,
            Command::Stop => device.position_ms = 0,
            Command::Pause | Command::Resume => {}
        }
        device.commands.push(command);
        Ok(())
    }
}

impl LocalPlaybackAdapter for MockLocal {
    fn play(&mut self, path: &Path, start_ms: u64) -> Result<()> {
        self.command(Command::Play {
            source: path.display().to_string(),
            start_ms,
        })
    }

    fn pause(&mut self) -> Result<()> {
        self.command(Command::Pause)
    }

    fn resume(&mut self) -> Result<()> {
        self.command(Command::Resume)
    }

    fn seek(&mut self, position_ms: u64) -> Result<()> {
        self.command(Command::Seek(position_ms))
    }

    fn stop(&mut self) -> Result<()> {
        self.command(Command::Stop)
    }

    fn position_ms(&self) -> u64 {
        self.0.borrow().position_ms
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.0.borrow_mut().rate = rate;
    }
}

/// External adapter recording into a shared device
pub struct MockExternal(pub SharedDevice);

impl MockExternal {
    fn command(&self, command: Command) {
        self.0.borrow_mut().commands.push(command);
    }
}

impl ExternalPlaybackAdapter for MockExternal {
    fn play(&mut self, uri: &str, start_ms: u64) {
        self.command(Command::Play {
            source: uri.to_string(),
            start_ms,
        });
    }

    fn pause(&mut self) {
        self.command(Command::Pause);
    }

    fn resume(&mut self) {
        self.command(Command::Resume);
    }

    fn seek(&mut self, position_ms: u64) {
        self.command(Command::Seek(position_ms));
    }

    fn stop(&mut self) {
        self.command(Command::Stop);
    }
}

/// Factory handing out mock adapters; devices are kept in creation order
#[derive(Clone, Default)]
pub struct MockFactory {
    devices: Rc<RefCell<Vec<SharedDevice>>>,
}

impl MockFactory {
    pub fn device(&self, index: usize) -> SharedDevice {
        Rc::clone(&self.devices.borrow()[index])
    }

    fn create(&self) -> SharedDevice {
        let device = SharedDevice::default();
        self.devices.borrow_mut().push(Rc::clone(&device));
        device
    }
}

impl AdapterFactory for MockFactory {
    fn local(&mut self, _path: &Path) -> Box<dyn LocalPlaybackAdapter> {
        Box::new(MockLocal(self.create()))
    }

    fn external(&mut self, _uri: &str) -> Box<dyn ExternalPlaybackAdapter> {
        Box::new(MockExternal(self.create()))
    }
}

/// A standalone controller for `cue` plus its mock device
pub fn controller_for(cue: &Cue) -> (PlaybackController, SharedDevice, CueId) {
    let mut store = CueStore::new();
    let id = store.insert(cue.clone());
    let mut factory = MockFactory::default();
    let controller = PlaybackController::new(id, cue, &mut factory, ControllerConfig::default());
    (controller, factory.device(0), id)
}

pub fn local_cue() -> Cue {
    Cue::from_user_input("/show/rain.wav")
}

pub fn remote_cue() -> Cue {
    Cue::from_user_input("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC")
}

pub fn count_fade_out_finished(events: &[CueEvent]) -> usize {
    events.iter().filter(|e| e.is_fade_out_finished()).count()
}

pub fn count_looped(events: &[CueEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, CueEvent::Looped { .. }))
        .count()
}

pub fn states(events: &[CueEvent]) -> Vec<cue_playback::PlaybackState> {
    events
        .iter()
        .filter_map(|e| match e {
            CueEvent::StateChanged { state, .. } => Some(*state),
            _ => None,
        })
        .collect()
}
