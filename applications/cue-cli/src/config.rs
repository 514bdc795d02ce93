//! Player configuration

use anyhow::Context;
use cue_playback::ControllerConfig;
use cue_waveform::WaveformConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub playback: ControllerConfig,

    #[serde(default)]
    pub waveform: WaveformConfig,

    /// Master fader position (0-100)
    #[serde(default = "default_master_fader")]
    pub master_fader: u8,

    /// Folder local cue file names are resolved against; defaults to the
    /// show file's own directory
    #[serde(default)]
    pub audio_folder: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playback: ControllerConfig::default(),
            waveform: WaveformConfig::default(),
            master_fader: default_master_fader(),
            audio_folder: None,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables are prefixed with `CUE_` and nest with `__`,
    /// e.g. `CUE_PLAYBACK__FADE_TICK_MS=10` or `CUE_MASTER_FADER=80`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CUE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .context("Failed to read configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.master_fader > 100 {
            anyhow::bail!("master_fader must be 0-100, got {}", self.master_fader);
        }
        Ok(())
    }
}

fn default_master_fader() -> u8 {
    100
}
