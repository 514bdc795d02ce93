//! Cue Player Core
//!
//! Platform-agnostic data model for the cue player: cues, their source
//! descriptors, the arena that hands out stable cue handles, and the record
//! shape show files are persisted in.
//!
//! # Example
//!
//! ```rust
//! use cue_core::{Cue, CueStore, LoopMode};
//!
//! let mut store = CueStore::new();
//!
//! let mut cue = Cue::from_user_input("/show/thunder.wav");
//! cue.set_fade_out_secs(2.0);
//! cue.set_loop_mode(LoopMode::Count);
//! cue.set_loop_count(3);
//! cue.hotkey = Some('t');
//!
//! let id = store.insert(cue);
//! assert_eq!(store.find_by_hotkey('T'), Some(id));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod record;
pub mod store;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use error::{CueError, Result};
pub use record::{audio_folder_for, CueRecord, ShowFile};
pub use store::CueStore;
pub use timing::{format_clock, RegionTiming, PLACEHOLDER_CLOCK};
pub use types::{Cue, CueId, CueSource, LoopMode, Region};
