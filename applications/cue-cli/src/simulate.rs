//! `cue simulate`: run a show on the deterministic clock
//!
//! Every cue gets a simulated transport that advances its position in step
//! with the clock. Local transports report their position on every step;
//! external ones report once a second, like a remote provider that is
//! polled, and the controller extrapolates in between.

use anyhow::Context;
use cue_core::{format_clock, Cue, CueId};
use cue_playback::{
    AdapterFactory, CueEvent, CueTransport, ExternalPlaybackAdapter, LocalPlaybackAdapter,
};
use std::cell::RefCell;
use std::fmt::Write;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::show::Show;

/// How often a simulated remote provider reports its state
const PROVIDER_REPORT_INTERVAL_MS: u64 = 1_000;

// ===== Simulated transports =====

/// Playback state of one simulated transport
#[derive(Debug, Clone, PartialEq)]
pub struct SimDevice {
    pub position_ms: u64,
    pub playing: bool,
    pub volume: f64,
    pub rate: f64,
}

impl Default for SimDevice {
    fn default() -> Self {
        Self {
            position_ms: 0,
            playing: false,
            volume: 0.0,
            rate: 1.0,
        }
    }
}

impl SimDevice {
    fn play(&mut self, start_ms: u64) {
        self.position_ms = start_ms;
        self.playing = true;
    }

    fn stop(&mut self) {
        self.position_ms = 0;
        self.playing = false;
    }

    /// Move the position by `step_ms` of wall time, capped at `media_ms`
    fn tick(&mut self, step_ms: u64, media_ms: u64) -> Option<u64> {
        if !self.playing {
            return None;
        }
        let advanced = (step_ms as f64 * self.rate).round() as u64;
        self.position_ms = (self.position_ms + advanced).min(media_ms);
        Some(self.position_ms)
    }
}

type SharedDevice = Rc<RefCell<SimDevice>>;

struct SimLocal(SharedDevice);

impl LocalPlaybackAdapter for SimLocal {
    fn play(&mut self, _path: &Path, start_ms: u64) -> cue_playback::Result<()> {
        self.0.borrow_mut().play(start_ms);
        Ok(())
    }

    fn pause(&mut self) -> cue_playback::Result<()> {
        self.0.borrow_mut().playing = false;
        Ok(())
    }

    fn resume(&mut self) -> cue_playback::Result<()> {
        self.0.borrow_mut().playing = true;
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> cue_playback::Result<()> {
        self.0.borrow_mut().position_ms = position_ms;
        Ok(())
    }

    fn stop(&mut self) -> cue_playback::Result<()> {
        self.0.borrow_mut().stop();
        Ok(())
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

struct SimExternal(SharedDevice);

impl ExternalPlaybackAdapter for SimExternal {
    fn play(&mut self, _uri: &str, start_ms: u64) {
        self.0.borrow_mut().play(start_ms);
    }

    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }

    fn resume(&mut self) {
        self.0.borrow_mut().playing = true;
    }

    fn seek(&mut self, position_ms: u64) {
        self.0.borrow_mut().position_ms = position_ms;
    }

    fn stop(&mut self) {
        self.0.borrow_mut().stop();
    }
}

/// Hands out simulated transports in cue order
#[derive(Clone, Default)]
struct SimFactory {
    devices: Rc<RefCell<Vec<SharedDevice>>>,
}

impl SimFactory {
    fn create(&self) -> SharedDevice {
        let device = SharedDevice::default();
        self.devices.borrow_mut().push(Rc::clone(&device));
        device
    }

    fn device(&self, index: usize) -> Option<SharedDevice> {
        self.devices.borrow().get(index).map(Rc::clone)
    }
}

impl AdapterFactory for SimFactory {
    fn local(&mut self, _path: &Path) -> Box<dyn LocalPlaybackAdapter> {
        Box::new(SimLocal(self.create()))
    }

    fn external(&mut self, _uri: &str) -> Box<dyn ExternalPlaybackAdapter> {
        Box::new(SimExternal(self.create()))
    }
}

// ===== Simulation =====

/// What to simulate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOptions {
    /// Index of the cue to trigger
    pub cue_index: usize,

    /// How long to run the clock
    pub seconds: f64,

    /// Clock step
    pub step_ms: u64,

    /// Length of the simulated media behind every cue
    pub media_secs: f64,

    /// Include position and volume updates in the log
    pub verbose: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            cue_index: 0,
            seconds: 10.0,
            step_ms: 50,
            media_secs: 120.0,
            verbose: false,
        }
    }
}

/// One logged event
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at_ms: u64,
    pub cue_index: usize,
    pub event: CueEvent,
}

/// Trigger one cue of `show` and log what happens
pub fn run(
    show: &Show,
    config: &PlayerConfig,
    options: SimulationOptions,
) -> anyhow::Result<Vec<LogEntry>> {
    if show.cue(options.cue_index).is_none() {
        anyhow::bail!(
            "cue {} does not exist ({} cues in {})",
            options.cue_index,
            show.cues.len(),
            show.path.display()
        );
    }

    let factory = SimFactory::default();
    let mut transport = CueTransport::new(Box::new(factory.clone()), config.playback);
    transport.set_master_fader(config.master_fader);

    let ids: Vec<CueId> = show
        .cues
        .iter()
        .cloned()
        .map(|cue| transport.add_cue(cue))
        .collect();

    let media_ms = (options.media_secs.max(0.0) * 1000.0).round() as u64;
    for (cue, id) in show.cues.iter().zip(&ids) {
        announce_duration(&mut transport, cue, *id, media_ms)?;
    }
    transport.drain_events();

    let mut log = Vec::new();
    let step_ms = options.step_ms.max(1);
    let total_ms = (options.seconds.max(0.0) * 1000.0).round() as u64;

    info!(
        "Simulating cue {} for {}ms in {}ms steps",
        options.cue_index, total_ms, step_ms
    );
    transport
        .trigger(ids[options.cue_index])
        .context("Failed to trigger cue")?;
    record_events(&mut transport, &ids, 0, options.verbose, &mut log);

    let mut now_ms = 0;
    while now_ms < total_ms {
        now_ms += step_ms;
        transport.advance(Duration::from_millis(step_ms));

        for (index, (cue, id)) in show.cues.iter().zip(&ids).enumerate() {
            let Some(device) = factory.device(index) else {
                continue;
            };
            let Some(position) = device.borrow_mut().tick(step_ms, media_ms) else {
                continue;
            };

            if cue.is_remote() {
                if now_ms % PROVIDER_REPORT_INTERVAL_MS < step_ms {
                    let playing = device.borrow().playing;
                    transport.on_playback_state_reported(
                        *id,
                        Some(position),
                        Some(media_ms),
                        playing,
                    )?;
                }
            } else {
                transport.on_position_changed(*id, position)?;
            }
        }

        record_events(&mut transport, &ids, now_ms, options.verbose, &mut log);
    }

    debug!("Simulation logged {} events", log.len());
    Ok(log)
}

/// Render a log, one event per line
pub fn render(show: &Show, log: &[LogEntry]) -> String {
    let mut out = String::new();
    for entry in log {
        let name = show
            .cue(entry.cue_index)
            .map(Cue::display_name)
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "[{}] #{} {}: {}",
            format_clock(entry.at_ms),
            entry.cue_index,
            name,
            describe(&entry.event)
        );
    }
    out
}

/// Human-readable form of an event
pub fn describe(event: &CueEvent) -> String {
    match event {
        CueEvent::StateChanged { state, .. } => format!("state {}", state),
        CueEvent::FadeOutFinished { .. } => "fade-out finished".to_string(),
        CueEvent::PositionUpdate { position_ms, .. } => {
            format!("position {}", format_clock(*position_ms))
        }
        CueEvent::Looped {
            remaining: Some(remaining),
            ..
        } => format!("looped ({} left)", remaining),
        CueEvent::Looped { remaining: None, .. } => "looped".to_string(),
        CueEvent::DurationKnown { duration_ms, .. } => {
            format!("duration {}", format_clock(*duration_ms))
        }
        CueEvent::RegionChanged {
            start_ms, end_ms, ..
        } => format!(
            "region {} -> {}",
            format_clock(*start_ms),
            end_ms.map_or_else(|| "end".to_string(), format_clock)
        ),
        CueEvent::VolumeChanged { volume, .. } => format!("volume {:.3}", volume),
        CueEvent::Error { message, .. } => format!("error: {}", message),
    }
}

// Local media reports its length once loaded; remote media only while
// playing, unless the show file cached it
fn announce_duration(
    transport: &mut CueTransport,
    cue: &Cue,
    id: CueId,
    media_ms: u64,
) -> anyhow::Result<()> {
    if media_ms == 0 {
        return Ok(());
    }
    if !cue.is_remote() {
        transport.on_duration_known(id, media_ms)?;
    }
    Ok(())
}

fn record_events(
    transport: &mut CueTransport,
    ids: &[CueId],
    at_ms: u64,
    verbose: bool,
    log: &mut Vec<LogEntry>,
) {
    for event in transport.drain_events() {
        let noisy = matches!(
            event,
            CueEvent::PositionUpdate { .. } | CueEvent::VolumeChanged { .. }
        );
        if noisy && !verbose {
            continue;
        }
        if let Some(cue_index) = ids.iter().position(|id| *id == event.cue()) {
            log.push(LogEntry {
                at_ms,
                cue_index,
                event,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_ticks_at_its_rate() {
        let mut device = SimDevice {
            rate: 2.0,
            ..SimDevice::default()
        };
        assert_eq!(device.tick(50, 1_000), None);

        device.play(100);
        assert_eq!(device.tick(50, 1_000), Some(200));
        assert_eq!(device.tick(5_000, 1_000), Some(1_000));
    }

    #[test]
    fn describes_events() {
        let mut store = cue_core::CueStore::new();
        let cue = store.insert(Cue::from_user_input("/show/rain.wav"));

        assert_eq!(
            describe(&CueEvent::Looped {
                cue,
                remaining: Some(2)
            }),
            "looped (2 left)"
        );
        assert_eq!(
            describe(&CueEvent::RegionChanged {
                cue,
                start_ms: 1_500,
                end_ms: None
            }),
            "region 00:01.500 -> end"
        );
        assert_eq!(
            describe(&CueEvent::FadeOutFinished { cue }),
            "fade-out finished"
        );
    }
}
