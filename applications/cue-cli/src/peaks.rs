//! `cue peaks`: decode a file and report its waveform peaks

use anyhow::Context;
use cue_waveform::{load_file, WaveformConfig};
use serde::Serialize;
use std::path::Path;

/// Peaks of one file, as printed by `cue peaks`
#[derive(Debug, Clone, Serialize)]
pub struct PeaksReport {
    pub file: String,
    pub duration_ms: u64,
    pub width: u32,
    pub peaks: Vec<f32>,
}

/// Decode `path` and decimate it to `width` peaks
pub fn compute(path: &Path, width: u32, config: WaveformConfig) -> anyhow::Result<PeaksReport> {
    if width == 0 {
        anyhow::bail!("width must be at least 1");
    }

    let model = load_file(path, config, width)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    Ok(PeaksReport {
        file: path.display().to_string(),
        duration_ms: model.duration_ms(),
        width,
        peaks: model.peaks().to_vec(),
    })
}
