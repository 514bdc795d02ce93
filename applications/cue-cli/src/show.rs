//! Show file loading

use anyhow::Context;
use cue_core::{audio_folder_for, Cue, ShowFile};
use std::path::{Path, PathBuf};
use tracing::info;

/// A loaded show: its cues in file order
#[derive(Debug, Clone)]
pub struct Show {
    pub path: PathBuf,
    pub audio_folder: PathBuf,
    pub cues: Vec<Cue>,
}

impl Show {
    /// Load `path`, resolving local file names against `audio_folder` (or
    /// the show's directory)
    ///
    /// Broken records are skipped with a warning rather than failing the
    /// whole show.
    pub fn load(path: &Path, audio_folder: Option<&Path>) -> anyhow::Result<Self> {
        let file = ShowFile::load(path)
            .with_context(|| format!("Failed to load show file {}", path.display()))?;

        let audio_folder = audio_folder.map_or_else(|| audio_folder_for(path), Path::to_path_buf);
        let cues = file.into_cues(&audio_folder);

        info!("Loaded {} cues from {}", cues.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            audio_folder,
            cues,
        })
    }

    pub fn cue(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }
}
