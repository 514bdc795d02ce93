//! Cue Player - Playback Engine
//!
//! Platform-agnostic cue playback for Cue Player.
//!
//! This crate provides:
//! - Per-cue state machine (Idle, Playing, Paused, FadingIn, FadingOut)
//! - Fade envelopes (cubic fade-in, linear fade-out, pop-free restarts)
//! - Gain staging with a perceptually shaped master fader and mute
//! - Region looping (none, infinite, counted)
//! - Position estimation for externally played tracks
//! - A deterministic tick scheduler (no wall-clock timers)
//! - Show-level transport with fade-then-start cue changes
//!
//! # Architecture
//!
//! `cue-playback` never touches audio hardware or the network. Audio output
//! and remote providers are reached through two adapter traits:
//! [`LocalPlaybackAdapter`] for decoded files and [`ExternalPlaybackAdapter`]
//! for tracks played by a remote provider. Each controller picks one when it
//! is built and presents the same state machine over either.
//!
//! Everything is single-threaded: commands, adapter callbacks and clock
//! advances are plain method calls, and their effects are reported as
//! [`CueEvent`]s drained by the caller.
//!
//! # Example
//!
//! ```rust
//! use cue_core::Cue;
//! use cue_playback::{
//!     AdapterFactory, ControllerConfig, CueTransport, ExternalPlaybackAdapter,
//!     LocalPlaybackAdapter, PlaybackState, Result,
//! };
//! use std::path::Path;
//! use std::time::Duration;
//!
//! struct Silent;
//!
//! impl LocalPlaybackAdapter for Silent {
//!     fn play(&mut self, _path: &Path, _start_ms: u64) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) -> Result<()> { Ok(()) }
//!     fn resume(&mut self) -> Result<()> { Ok(()) }
//!     fn seek(&mut self, _position_ms: u64) -> Result<()> { Ok(()) }
//!     fn stop(&mut self) -> Result<()> { Ok(()) }
//!     fn position_ms(&self) -> u64 { 0 }
//!     fn set_volume(&mut self, _volume: f64) {}
//!     fn set_playback_rate(&mut self, _rate: f64) {}
//! }
//!
//! impl ExternalPlaybackAdapter for Silent {
//!     fn play(&mut self, _uri: &str, _start_ms: u64) {}
//!     fn pause(&mut self) {}
//!     fn resume(&mut self) {}
//!     fn seek(&mut self, _position_ms: u64) {}
//!     fn stop(&mut self) {}
//! }
//!
//! struct Factory;
//!
//! impl AdapterFactory for Factory {
//!     fn local(&mut self, _path: &Path) -> Box<dyn LocalPlaybackAdapter> { Box::new(Silent) }
//!     fn external(&mut self, _uri: &str) -> Box<dyn ExternalPlaybackAdapter> { Box::new(Silent) }
//! }
//!
//! let mut transport = CueTransport::new(Box::new(Factory), ControllerConfig::default());
//!
//! let mut cue = Cue::from_user_input("/show/rain.wav");
//! cue.set_fade_in_secs(1.0);
//! let rain = transport.add_cue(cue);
//!
//! transport.trigger(rain)?;
//! assert_eq!(transport.state(rain), Some(PlaybackState::FadingIn));
//!
//! transport.advance(Duration::from_secs(1));
//! assert_eq!(transport.state(rain), Some(PlaybackState::Playing));
//! # Ok::<(), cue_playback::PlaybackError>(())
//! ```

#![forbid(unsafe_code)]

mod adapter;
mod backend;
mod config;
mod controller;
pub mod envelope;
mod error;
mod events;
pub mod gain;
pub mod position;
pub mod scheduler;
mod session;
mod transport;
pub mod types;

// Public exports
pub use adapter::{AdapterFactory, ExternalPlaybackAdapter, LocalPlaybackAdapter};
pub use config::ControllerConfig;
pub use controller::PlaybackController;
pub use envelope::{FadeEnvelope, FadeKind};
pub use error::{PlaybackError, Result};
pub use events::CueEvent;
pub use gain::{shape_master_fader, GainStage, MasterVolume};
pub use position::PositionEstimator;
pub use scheduler::{TickKind, TickScheduler};
pub use session::PlaybackSession;
pub use transport::CueTransport;
pub use types::PlaybackState;
