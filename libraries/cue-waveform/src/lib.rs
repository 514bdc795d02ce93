//! Cue Player - Waveform
//!
//! Display model for a cue's waveform. It draws nothing itself; it answers
//! the questions a view needs answered:
//! - which peak to draw in each pixel column (peak-preserving decimation)
//! - where a time lands on screen, and which time is under the pointer,
//!   with an optional zoom window that follows the playhead
//! - what a press-and-drag gesture moves (start marker, end marker or the
//!   playhead) while keeping `start <= end`
//!
//! Decoded PCM can be pushed in buffer by buffer from any decoder. With the
//! `decode` feature (on by default) [`decode_into`] reads audio files with
//! Symphonia.
//!
//! # Example
//!
//! ```rust
//! use cue_waveform::{PcmBuffer, PcmSamples, WaveformModel};
//!
//! let samples: Vec<f32> = (0..48_000).map(|i| (i as f32 / 48_000.0) - 0.5).collect();
//!
//! let mut waveform = WaveformModel::default();
//! waveform.resize(480);
//! waveform.begin_decoding();
//! waveform.append_buffer(&PcmBuffer::new(PcmSamples::F32(&samples), 1, 48_000), None);
//! waveform.finish_decoding();
//!
//! assert_eq!(waveform.duration_ms(), 1_000);
//! assert_eq!(waveform.peaks().len(), 480);
//!
//! // Dragging the end marker below the start pins it to the start
//! waveform.set_start(500);
//! waveform.set_end(800);
//! waveform.press(waveform.ms_to_x(800));
//! waveform.drag(10);
//! assert_eq!(waveform.end_ms(), 500);
//! ```

#![forbid(unsafe_code)]

mod config;
#[cfg(feature = "decode")]
mod decode;
mod error;
mod events;
pub mod markers;
mod model;
pub mod pcm;
pub mod peaks;
pub mod view;

// Public exports
pub use config::WaveformConfig;
#[cfg(feature = "decode")]
pub use decode::{decode_into, load_file, supports_format};
pub use error::{Result, WaveformError};
pub use events::WaveformEvent;
pub use markers::{DragMode, Overlay};
pub use model::WaveformModel;
pub use pcm::{PcmBuffer, PcmSamples};
pub use peaks::decimate_peaks;
pub use view::ZoomWindow;
