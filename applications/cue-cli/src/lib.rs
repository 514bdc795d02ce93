//! Cue Player CLI
//!
//! Inspects show files, computes waveform peaks and runs shows on the
//! deterministic clock against simulated transports.

pub mod config;
pub mod inspect;
pub mod peaks;
pub mod show;
pub mod simulate;
